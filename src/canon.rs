//! Canonical graph keys.
//!
//! A multigraph is encoded as an *expanded* simple graph: every bundle
//! of k parallel edges gains k-1 subdivision vertices, so two
//! multigraphs are isomorphic exactly when their expansions are.  The
//! expansion is then canonically relabelled, and the key is the byte
//! image of (real vertex count, expanded vertex count, edge count)
//! followed by the packed adjacency bits of the canonical form.  Byte
//! equality of keys coincides with multigraph isomorphism.
//!
//! The canonical labelling is iterated equitable refinement plus
//! individualisation: cells split by their per-cell neighbour counts
//! until stable, then each member of the first non-singleton cell is
//! tried in turn, and the lexicographically least packed adjacency over
//! all discrete leaves wins.
use std::convert::TryInto;
use std::hash::Hasher;
use fnv::FnvHasher;
use hashbrown::HashMap;
use crate::graph::{Graph, Vert};

const W: usize = 64;

#[inline] fn words_per_row(nn: usize)->usize { if nn % W > 0 { nn/W + 1 } else { nn/W }}

/// row-major packed adjacency used both before and after relabelling.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BitAdj { nn: usize, m: usize, words: Vec<u64> }

impl BitAdj {
  fn new(nn: usize)->Self {
    let m = words_per_row(nn);
    BitAdj { nn, m, words: vec![0; nn*m] }}

  #[inline] fn set(&mut self, i:usize, j:usize) {
    self.words[i*self.m + j/W] |= 1u64 << (W - 1 - (j % W)); }

  #[inline] fn get(&self, i:usize, j:usize)->bool {
    self.words[i*self.m + j/W] & (1u64 << (W - 1 - (j % W))) != 0 }

  fn add_edge(&mut self, i:usize, j:usize) { self.set(i,j); self.set(j,i); }

  /// adjacency rewritten so that `lab[pos]` lands at `pos`.
  fn permuted(&self, lab:&[u32])->BitAdj {
    let mut r = BitAdj::new(self.nn);
    for i in 0..self.nn {
      for j in 0..self.nn {
        if self.get(lab[i] as usize, lab[j] as usize) { r.set(i,j) }}}
    r }}

/// A canonical key.  The labelling maps canonical positions back to
/// the expanded graph's original vertex numbers; it travels with the
/// in-memory key but is excluded from the byte image, so equality and
/// hashing see only the header and adjacency bits.
#[derive(Clone, Debug)]
pub struct GraphKey {
  n: u64,
  nn: u64,
  e: u64,
  adj: BitAdj,
  lab: Vec<u32> }

impl GraphKey {
  /// Build the key for a loop-free multigraph.
  pub fn build(g:&Graph)->GraphKey {
    let verts: Vec<Vert> = g.verts().collect();
    let n = verts.len();
    let mut vtxmap = vec![0usize; g.domain()];
    for (i,&v) in verts.iter().enumerate() { vtxmap[v as usize] = i; }

    let mut nn = n;
    for (u,v,c) in g.bundles() {
      debug_assert!(u != v, "keys are built after loop reduction");
      nn += (c as usize) - 1; }

    let mut adj = BitAdj::new(nn);
    let mut e = 0u64;
    let mut sub = n; // next subdivision vertex
    for (u,v,c) in g.bundles() {
      let (mu, mv) = (vtxmap[u as usize], vtxmap[v as usize]);
      adj.add_edge(mu, mv);
      e += 1;
      for _ in 1..c {
        adj.add_edge(mu, sub);
        adj.add_edge(sub, mv);
        e += 2;
        sub += 1; }}

    let lab = canon_label(&adj);
    let canon = adj.permuted(&lab);
    GraphKey { n: n as u64, nn: nn as u64, e, adj: canon, lab }}

  /// canonical position -> expanded-graph vertex.
  pub fn labelling(&self)->&[u32] { &self.lab }

  /// the byte image stored in the cache: header then adjacency words,
  /// all little-endian.
  pub fn to_bytes(&self)->Vec<u8> {
    let mut out = Vec::with_capacity(8*(3 + self.adj.words.len()));
    for w in [self.n, self.nn, self.e] { out.extend_from_slice(&w.to_le_bytes()); }
    for w in &self.adj.words { out.extend_from_slice(&w.to_le_bytes()); }
    out }}

/// bucket hash over a key's byte image.
pub fn hash_key(key:&[u8])->u64 {
  let mut h = FnvHasher::default();
  h.write(key);
  h.finish() }

/// real vertex count recorded in a key's byte image.
pub fn real_vertices(key:&[u8])->u64 {
  u64::from_le_bytes(key[0..8].try_into().unwrap()) }

/// expanded vertex count; larger than `real_vertices` exactly when the
/// keyed graph had parallel edges.
pub fn expanded_vertices(key:&[u8])->u64 {
  u64::from_le_bytes(key[8..16].try_into().unwrap()) }

// -- canonical labelling --------------------------------------------

type Partition = Vec<Vec<u32>>;

/// split every cell by its members' neighbour counts against all
/// cells, until the partition is equitable.  Cell order (and the sort
/// of the count signatures) is what makes the result independent of
/// the input labelling.
fn refine(adj:&BitAdj, mut p:Partition)->Partition {
  loop {
    let mut cellof = vec![0u32; adj.nn];
    for (ci,cell) in p.iter().enumerate() {
      for &v in cell { cellof[v as usize] = ci as u32; }}
    let ncells = p.len();
    let mut newp: Partition = Vec::with_capacity(ncells);
    let mut changed = false;
    for cell in &p {
      if cell.len() == 1 { newp.push(cell.clone()); continue }
      let mut groups: HashMap<Vec<u32>, Vec<u32>> = HashMap::new();
      for &v in cell {
        let mut sig = vec![0u32; ncells];
        for w in 0..adj.nn {
          if adj.get(v as usize, w) { sig[cellof[w] as usize] += 1; }}
        groups.entry(sig).or_insert_with(Vec::new).push(v); }
      if groups.len() == 1 {
        newp.push(cell.clone()); }
      else {
        changed = true;
        let mut split: Vec<(Vec<u32>, Vec<u32>)> = groups.into_iter().collect();
        split.sort();
        for (_, members) in split { newp.push(members); }}}
    p = newp;
    if !changed { return p }}}

fn search(adj:&BitAdj, p:Partition, best:&mut Option<(Vec<u64>, Vec<u32>)>) {
  if let Some(ci) = p.iter().position(|c| c.len() > 1) {
    for k in 0..p[ci].len() {
      let mut child: Partition = Vec::with_capacity(p.len()+1);
      for (i,cell) in p.iter().enumerate() {
        if i == ci {
          child.push(vec![cell[k]]);
          let rest: Vec<u32> = cell.iter().enumerate()
            .filter(|&(j,_)| j != k).map(|(_,&v)| v).collect();
          child.push(rest); }
        else { child.push(cell.clone()); }}
      search(adj, refine(adj, child), best); }}
  else {
    let lab: Vec<u32> = p.iter().map(|c| c[0]).collect();
    let words = adj.permuted(&lab).words;
    match best {
      Some((bw,_)) if *bw <= words => {},
      _ => { *best = Some((words, lab)); }}}}

/// canonical labelling of a packed simple graph; isomorphic inputs get
/// byte-identical canonical adjacency no matter how they were
/// labelled.
fn canon_label(adj:&BitAdj)->Vec<u32> {
  if adj.nn == 0 { return vec![] }
  let whole: Partition = vec![(0..adj.nn as u32).collect()];
  let mut best = None;
  search(adj, refine(adj, whole), &mut best);
  best.unwrap().1 }


// -- tests ----------------------------------------------------------

#[cfg(test)]
fn key_of(g:&Graph)->Vec<u8> { GraphKey::build(g).to_bytes() }

#[test] fn test_relabelled_triangle() {
  let mut g = Graph::new(3);
  g.add_edge(0,1); g.add_edge(1,2); g.add_edge(2,0);
  let k = key_of(&g);
  for order in [[1,2,0],[2,0,1],[2,1,0]] {
    let p = g.permuted(&order);
    assert_eq!(key_of(&p), k); }}

#[test] fn test_multigraph_keys() {
  // triangle with a doubled edge: same key wherever the doubling sits
  let mk = |doubled:(u32,u32)| {
    let mut g = Graph::new(3);
    g.add_edge(0,1); g.add_edge(1,2); g.add_edge(2,0);
    g.add_edge(doubled.0, doubled.1);
    key_of(&g) };
  let k = mk((0,1));
  assert_eq!(mk((1,2)), k);
  assert_eq!(mk((2,0)), k);
  // but it differs from the plain triangle and from the square, which
  // has the same expanded size
  let mut tri = Graph::new(3);
  tri.add_edge(0,1); tri.add_edge(1,2); tri.add_edge(2,0);
  assert_ne!(key_of(&tri), k);
  let mut sq = Graph::new(4);
  sq.add_edge(0,1); sq.add_edge(1,2); sq.add_edge(2,3); sq.add_edge(3,0);
  assert_eq!(expanded_vertices(&key_of(&sq)), expanded_vertices(&k));
  assert_ne!(key_of(&sq), k) }

#[test] fn test_nonisomorphic_same_counts() {
  // P4 and the claw agree on every header field
  let mut p4 = Graph::new(4);
  p4.add_edge(0,1); p4.add_edge(1,2); p4.add_edge(2,3);
  let mut claw = Graph::new(4);
  claw.add_edge(0,1); claw.add_edge(0,2); claw.add_edge(0,3);
  let (kp, kc) = (key_of(&p4), key_of(&claw));
  assert_eq!(kp.len(), kc.len());
  assert_eq!(real_vertices(&kp), real_vertices(&kc));
  assert_ne!(kp, kc) }

#[test] fn test_key_header() {
  let mut g = Graph::new(2);
  g.add_edges(0,1,3);
  let k = key_of(&g);
  assert_eq!(real_vertices(&k), 2);
  assert_eq!(expanded_vertices(&k), 4); // two subdivision vertices
  assert_ne!(hash_key(&k), hash_key(&key_of(&Graph::new(0)))) }

#[test] fn test_labelling_is_permutation() {
  let mut g = Graph::new(4);
  g.add_edge(0,1); g.add_edge(1,2); g.add_edge(2,3); g.add_edge(3,0);
  let key = GraphKey::build(&g);
  let mut seen = vec![false; 4];
  for &v in key.labelling() { seen[v as usize] = true; }
  assert!(seen.iter().all(|&b| b)) }

#[test] fn test_canon_deterministic() {
  let mut g = Graph::new(5);
  g.add_edge(0,1); g.add_edge(1,2); g.add_edge(2,3); g.add_edge(3,4);
  g.add_edge(4,0); g.add_edge(0,2);
  assert_eq!(key_of(&g), key_of(&g.clone())) }
