//! Input parsing.
//!
//! A graph file is a whitespace-separated sequence of graphs; each
//! graph is a comma-separated list of `tail--head` edges with
//! non-negative decimal endpoints.  Vertex ids need not be contiguous;
//! the driver compacts them before evaluation.
use crate::error::{Error, Result};
use crate::graph::Graph;

fn number(s:&str, ctx:&str)->Result<u32> {
  s.parse().map_err(|_| Error::InputSyntax(
    format!("expected a vertex number, got '{}' in '{}'", s, ctx))) }

/// parse one whitespace-delimited graph token.
pub fn read_graph(token:&str)->Result<Graph> {
  let mut edges: Vec<(u32,u32)> = vec![];
  let mut maxv = 0u32;
  for part in token.split(',') {
    let (t,h) = part.split_once("--").ok_or_else(|| Error::InputSyntax(
      format!("expected 'tail--head', got '{}'", part)))?;
    let tail = number(t, part)?;
    let head = number(h, part)?;
    maxv = maxv.max(tail).max(head);
    edges.push((tail, head)); }
  let mut g = Graph::new(maxv as usize + 1);
  for (t,h) in edges { g.add_edge(t,h); }
  Ok(g) }

/// byte amounts with K/M/G suffixes, e.g. "700M".
pub fn parse_amount(s:&str)->Result<u64> {
  let (digits, mult) = match s.as_bytes().last().copied() {
    Some(b'K') => (&s[..s.len()-1], 1u64 << 10),
    Some(b'M') => (&s[..s.len()-1], 1u64 << 20),
    Some(b'G') => (&s[..s.len()-1], 1u64 << 30),
    _ => (s, 1) };
  let n: u64 = digits.parse().map_err(|_| Error::InvalidArgument(
    format!("expected an amount like 700M, got '{}'", s)))?;
  Ok(n * mult) }

/// an evaluation point "x,y" with signed integer coordinates.
pub fn parse_evalpoint(s:&str)->Result<(i64,i64)> {
  let (x,y) = s.split_once(',').ok_or_else(|| Error::InvalidArgument(
    format!("expected an evaluation point like 1,-1, got '{}'", s)))?;
  let bad = || Error::InvalidArgument(format!("bad evaluation point '{}'", s));
  Ok((x.trim().parse().map_err(|_| bad())?,
      y.trim().parse().map_err(|_| bad())?)) }


// -- tests ----------------------------------------------------------

#[test] fn test_read_graph() {
  let g = read_graph("0--1,1--2,2--0,0--1").unwrap();
  assert_eq!(g.num_vertices(), 3);
  assert_eq!(g.num_edges(), 4);
  assert_eq!(g.multiplicity(0,1), 2) }

#[test] fn test_read_graph_sparse_ids() {
  // ids need not be contiguous; compaction closes the gaps
  let g = read_graph("2--7").unwrap();
  assert_eq!(g.num_edges(), 1);
  let c = g.compact();
  assert_eq!(c.num_vertices(), 2) }

#[test] fn test_read_graph_self_loop() {
  let g = read_graph("3--3").unwrap();
  assert_eq!(g.multiplicity(3,3), 1) }

#[test] fn test_read_graph_errors() {
  assert!(read_graph("0-1").is_err());
  assert!(read_graph("0--x").is_err());
  assert!(read_graph("0--1,").is_err()) }

#[test] fn test_parse_amount() {
  assert_eq!(parse_amount("700").unwrap(), 700);
  assert_eq!(parse_amount("2K").unwrap(), 2048);
  assert_eq!(parse_amount("700M").unwrap(), 700*1024*1024);
  assert_eq!(parse_amount("1G").unwrap(), 1024*1024*1024);
  assert!(parse_amount("12Q").is_err()) }

#[test] fn test_parse_evalpoint() {
  assert_eq!(parse_evalpoint("1,1").unwrap(), (1,1));
  assert_eq!(parse_evalpoint("-1,2").unwrap(), (-1,2));
  assert!(parse_evalpoint("7").is_err()) }
