//! Computation-tree trace output.
//!
//! Every recursive invocation carries a serial id; these records let a
//! reader (or the XML visualisation tooling) reconstruct the shape of
//! the recursion: which nodes split, which were closed-form leaves,
//! and which matched a cached isomorph.
use crate::graph::Graph;

pub struct TreeWriter {
  pub xml: bool,
  /// plain mode prints graph bodies only when asked.
  pub full: bool }

impl TreeWriter {
  pub fn start(&self, _tid: u32) {
    if self.xml { println!("<object-stream>"); }}

  pub fn end(&self, tid: u32) {
    if self.xml { println!("</object-stream>"); }
    else { println!("=== TREE {} END ===", tid); }}

  /// this node's polynomial came from the cache entry produced by
  /// `matched`.
  pub fn write_match(&self, my_id: u32, matched: u32, g:&Graph) {
    if self.xml {
      println!("<graphnode>");
      println!("<id>{}</id>", my_id);
      println!("<vertices>{}</vertices>", g.num_vertices());
      println!("<edges>{}</edges>", g.num_edges());
      println!("<match>{}</match>", matched);
      println!("</graphnode>"); }
    else { println!("{}={}", my_id, matched); }}

  pub fn leaf(&self, my_id: u32, g:&Graph) {
    if self.xml {
      println!("<graphnode>");
      println!("<id>{}</id>", my_id);
      println!("<vertices>{}</vertices>", g.num_vertices());
      println!("<edges>{}</edges>", g.num_edges());
      self.xml_graph(g);
      println!("</graphnode>"); }
    else if self.full { println!("{}={}", my_id, g); }}

  /// a node whose children are `start .. start+count`.
  pub fn nonleaf(&self, my_id: u32, start: u32, count: u32, g:&Graph) {
    if self.xml {
      let right: i64 = if count < 2 { -1 } else { (start+1) as i64 };
      println!("<graphnode>");
      println!("<id>{}</id>", my_id);
      println!("<vertices>{}</vertices>", g.num_vertices());
      println!("<edges>{}</edges>", g.num_edges());
      println!("<left>{}</left>", start);
      println!("<right>{}</right>", right);
      self.xml_graph(g);
      println!("</graphnode>"); }
    else {
      print!("{}=", my_id);
      for i in 0..count {
        if i != 0 { print!("+"); }
        print!("{}", start+i); }
      if self.full { print!("={}", g); }
      println!(); }}

  fn xml_graph(&self, g:&Graph) {
    println!("<graph>");
    println!("<struct>");
    for (u,v,c) in g.bundles() {
      println!("<edge>");
      println!("<sV>{}</sV>", u);
      println!("<fV>{}</fV>", v);
      println!("<nE>{}</nE>", c);
      println!("</edge>"); }
    println!("</struct></graph>"); }}
