//! Undirected multigraphs with counted parallel edges.
//!
//! Vertices are small integers; each vertex row maps neighbours to
//! multiplicities, and a self-loop lives in its own row keyed by the
//! vertex itself. Deleting the last parallel copy of an edge drops the
//! pair entirely, so `adj[u].get(&v)` is never `Some(0)`.
use std::collections::BTreeMap;
use std::fmt;
use crate::error::{Error, Result};

/// Vertex index.
pub type Vert = u32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
  /// symmetric adjacency; `adj[v][v]` counts self-loops on v.
  adj: Vec<BTreeMap<Vert, u32>>,
  /// contraction kills vertices without renumbering the rest.
  alive: Vec<bool>,
  nverts: u32,
  /// edge count with multiplicity (each loop counts its multiplicity).
  nedges: u64 }

impl Graph {
  pub fn new(n: usize)->Self {
    Graph { adj: vec![BTreeMap::new(); n], alive: vec![true; n], nverts: n as u32, nedges: 0 }}

  /// size of the vertex index space (dead vertices included).
  #[inline] pub fn domain(&self)->usize { self.adj.len() }
  #[inline] pub fn num_vertices(&self)->u32 { self.nverts }
  #[inline] pub fn num_edges(&self)->u64 { self.nedges }
  #[inline] pub fn is_alive(&self, v:Vert)->bool { self.alive[v as usize] }

  /// live vertices in index order.
  pub fn verts(&self)->impl Iterator<Item=Vert> + '_ {
    self.alive.iter().enumerate().filter(|(_,&a)| a).map(|(i,_)| i as Vert) }

  /// incident (neighbour, multiplicity) pairs of v, in index order.
  pub fn edges_at(&self, v:Vert)->impl Iterator<Item=(Vert,u32)> + '_ {
    self.adj[v as usize].iter().map(|(&w,&c)| (w,c)) }

  /// every edge bundle once, as (u, v, multiplicity) with u <= v.
  pub fn bundles(&self)->impl Iterator<Item=(Vert,Vert,u32)> + '_ {
    self.verts().flat_map(move |u|
      self.edges_at(u).filter(move |&(w,_)| u <= w).map(move |(w,c)| (u,w,c))) }

  /// incident edge count of v, with multiplicity.
  pub fn num_edges_at(&self, v:Vert)->u64 {
    self.adj[v as usize].values().map(|&c| c as u64).sum() }

  /// underlying degree of v: distinct neighbours, loops ignored.
  pub fn num_underlying_at(&self, v:Vert)->u32 {
    let row = &self.adj[v as usize];
    (row.len() - if row.contains_key(&v) {1} else {0}) as u32 }

  pub fn multiplicity(&self, u:Vert, v:Vert)->u32 {
    self.adj[u as usize].get(&v).copied().unwrap_or(0) }

  pub fn add_edge(&mut self, u:Vert, v:Vert) { self.add_edges(u,v,1) }

  pub fn add_edges(&mut self, u:Vert, v:Vert, k:u32) {
    if k == 0 { return }
    debug_assert!(self.alive[u as usize] && self.alive[v as usize]);
    *self.adj[u as usize].entry(v).or_insert(0) += k;
    if u != v { *self.adj[v as usize].entry(u).or_insert(0) += k; }
    self.nedges += k as u64; }

  pub fn remove_edge(&mut self, u:Vert, v:Vert)->Result<()> { self.remove_edges(u,v,1) }

  /// drop k parallel copies of u--v; the pair disappears when the
  /// multiplicity reaches zero.
  pub fn remove_edges(&mut self, u:Vert, v:Vert, k:u32)->Result<()> {
    let have = self.multiplicity(u,v);
    if have < k { return Err(Error::Internal("no such edge")) }
    if have == k {
      self.adj[u as usize].remove(&v);
      if u != v { self.adj[v as usize].remove(&u); }}
    else {
      *self.adj[u as usize].get_mut(&v).unwrap() -= k;
      if u != v { *self.adj[v as usize].get_mut(&u).unwrap() -= k; }}
    self.nedges -= k as u64;
    Ok(()) }

  /// drop the whole u--v bundle regardless of multiplicity.
  pub fn remove_all_edges(&mut self, u:Vert, v:Vert) {
    let have = self.multiplicity(u,v);
    if have > 0 { self.remove_edges(u,v,have).unwrap(); }}

  /// Contract k copies of u--v, identifying v into u.  Any surviving
  /// u--v copies become self-loops on u, and v's other incidences move
  /// to u with multiplicities summed. This is the Tutte/flow variant:
  /// parallel structure survives the merge.
  pub fn contract_edge(&mut self, u:Vert, v:Vert, k:u32)->Result<()> {
    if u == v { return Err(Error::Internal("contract of a loop")) }
    self.remove_edges(u,v,k)?;
    let rest = self.multiplicity(u,v);
    if rest > 0 {
      self.remove_edges(u,v,rest)?;
      self.add_edges(u,u,rest); }
    let row: Vec<(Vert,u32)> = self.edges_at(v).collect();
    for (w,c) in row {
      if w == v { // v's own loops follow it onto u
        self.remove_edges(v,v,c)?;
        self.add_edges(u,u,c); }
      else {
        self.remove_edges(v,w,c)?;
        self.add_edges(u,w,c); }}
    self.kill(v);
    Ok(()) }

  /// Contract u--v for the chromatic recurrence: the whole bundle is
  /// removed, v's incidences transfer to u, and any resulting parallel
  /// pair coalesces to a single edge. No loops are retained.
  pub fn simple_contract_edge(&mut self, u:Vert, v:Vert)->Result<()> {
    if u == v { return Err(Error::Internal("contract of a loop")) }
    let have = self.multiplicity(u,v);
    if have == 0 { return Err(Error::Internal("no such edge")) }
    self.remove_edges(u,v,have)?;
    let row: Vec<(Vert,u32)> = self.edges_at(v).collect();
    for (w,c) in row {
      self.remove_edges(v,w,c)?;
      if w == v || w == u { continue } // drop loops either way
      let merged = self.multiplicity(u,w);
      if merged == 0 { self.add_edge(u,w) }
      else if merged > 1 { // coalesce an existing parallel bundle too
        self.remove_edges(u,w,merged-1)?; }}
    self.kill(v);
    Ok(()) }

  fn kill(&mut self, v:Vert) {
    debug_assert!(self.adj[v as usize].is_empty());
    self.alive[v as usize] = false;
    self.nverts -= 1; }

  // -- structural predicates ---------------------------------------

  /// number of connected components among live vertices.
  pub fn num_components(&self)->u32 {
    let mut seen = vec![false; self.domain()];
    let mut n = 0;
    for v in self.verts() {
      if seen[v as usize] { continue }
      n += 1;
      let mut stack = vec![v];
      seen[v as usize] = true;
      while let Some(x) = stack.pop() {
        for (w,_) in self.edges_at(x) {
          if !seen[w as usize] { seen[w as usize] = true; stack.push(w) }}}}
    n }

  #[inline] pub fn is_connected(&self)->bool { self.num_components() <= 1 }

  /// a single vertex whose only edges are self-loops.
  pub fn is_loop(&self)->bool {
    self.nverts == 1 && self.nedges > 0 &&
      self.verts().all(|v| self.num_underlying_at(v) == 0) }

  pub fn num_loops(&self)->u64 {
    self.verts().map(|v| self.multiplicity(v,v) as u64).sum() }

  /// distinct vertex pairs carrying an edge, loops excluded.
  pub fn num_underlying_edges(&self)->u64 {
    self.bundles().filter(|&(u,v,_)| u != v).count() as u64 }

  /// connected, acyclic, and free of parallel edges and loops.
  pub fn is_tree(&self)->bool {
    self.is_multitree() && self.is_connected() &&
      self.bundles().all(|(_,_,c)| c == 1) }

  /// the underlying simple graph is a forest (parallel edges allowed,
  /// loops are cycles).
  pub fn is_multitree(&self)->bool {
    self.num_loops() == 0 &&
      self.num_underlying_edges() + self.num_components() as u64 == self.nverts as u64 }

  /// the underlying simple graph is one cycle.
  pub fn is_multicycle(&self)->bool {
    self.nverts >= 3 && self.num_loops() == 0 && self.is_connected() &&
      self.verts().all(|v| self.num_underlying_at(v) == 2) }

  /// 2-vertex-connected and not trivial: one biconnected piece
  /// spanning the whole graph.
  pub fn is_biconnected(&self)->bool {
    self.nverts >= 3 && self.is_connected() && self.bicomponents().len() == 1 }

  // -- reductions --------------------------------------------------

  /// strip every self-loop, returning how many were removed.  The
  /// underlying simple structure is untouched.
  pub fn reduce_loops(&mut self)->u64 {
    let mut total = 0u64;
    let vs: Vec<Vert> = self.verts().collect();
    for v in vs {
      let c = self.multiplicity(v,v);
      if c > 0 { self.remove_edges(v,v,c).unwrap(); total += c as u64; }}
    total }

  /// Biconnected components as lists of underlying edges, via the
  /// articulation-point DFS.  Bridges come back as single-edge
  /// components.
  fn bicomponents(&self)->Vec<Vec<(Vert,Vert)>> {
    struct Dfs<'a> {
      g: &'a Graph,
      index: u32,
      dfsnum: Vec<u32>,
      low: Vec<u32>,
      seen: Vec<bool>,
      estack: Vec<(Vert,Vert)>,
      comps: Vec<Vec<(Vert,Vert)>> }
    impl<'a> Dfs<'a> {
      fn visit(&mut self, v:Vert, parent:Option<Vert>) {
        let vi = v as usize;
        self.seen[vi] = true;
        self.dfsnum[vi] = self.index;
        self.low[vi] = self.index;
        self.index += 1;
        let mut skipped_parent = false;
        for (w,_) in self.g.edges_at(v) {
          if w == v { continue }
          if Some(w) == parent && !skipped_parent { skipped_parent = true; continue }
          let wi = w as usize;
          if !self.seen[wi] {
            self.estack.push((v,w));
            self.visit(w, Some(v));
            self.low[vi] = self.low[vi].min(self.low[wi]);
            if self.low[wi] >= self.dfsnum[vi] {
              // v articulates: everything above (v,w) is one component
              let mut comp = vec![];
              while let Some(e) = self.estack.pop() {
                comp.push(e);
                if e == (v,w) { break }}
              self.comps.push(comp); }}
          else if self.dfsnum[wi] < self.dfsnum[vi] {
            self.estack.push((v,w));
            self.low[vi] = self.low[vi].min(self.dfsnum[wi]); }}}}
    let n = self.domain();
    let mut dfs = Dfs { g: self, index: 0,
                        dfsnum: vec![0; n], low: vec![0; n], seen: vec![false; n],
                        estack: vec![], comps: vec![] };
    for v in self.verts() {
      if !dfs.seen[v as usize] { dfs.visit(v, None) }}
    dfs.comps }

  /// Extract every biconnected component that contains a cycle,
  /// removing its edges from this graph.  Afterwards only bridge
  /// bundles and isolated vertices remain (a forest of multitrees).
  /// Multiplicities ride along into the extracted subgraphs.
  pub fn extract_biconnected_components(&mut self)->Vec<Graph> {
    let mut out = vec![];
    for comp in self.bicomponents() {
      if comp.len() < 2 { continue } // a lone bridge stays behind
      let mut sub = Graph::new(self.domain());
      for d in 0..sub.domain() { sub.alive[d] = false; }
      sub.nverts = 0;
      for &(u,v) in &comp {
        for x in [u,v] {
          if !sub.alive[x as usize] { sub.alive[x as usize] = true; sub.nverts += 1; }}
        let c = self.multiplicity(u,v);
        sub.add_edges(u,v,c);
        self.remove_edges(u,v,c).unwrap(); }
      out.push(sub); }
    out }

  // -- relabelling -------------------------------------------------

  /// Renumber live vertices that carry at least one edge to a
  /// contiguous range starting at zero, dropping the rest.
  pub fn compact(&self)->Graph {
    let mut label = vec![0 as Vert; self.domain()];
    let mut counter: usize = 0;
    for v in self.verts() {
      if self.num_edges_at(v) > 0 { label[v as usize] = counter as Vert; counter += 1; }}
    let mut r = Graph::new(counter);
    for (u,v,c) in self.bundles() {
      r.add_edges(label[u as usize], label[v as usize], c); }
    r }

  /// Rebuild the graph with vertex v renamed to `order.position(v)`;
  /// `order` lists the old names in their new sequence and must cover
  /// every vertex that carries an edge.
  pub fn permuted(&self, order:&[Vert])->Graph {
    let mut inv = vec![0 as Vert; self.domain()];
    for (i,&v) in order.iter().enumerate() { inv[v as usize] = i as Vert; }
    let mut r = Graph::new(order.len());
    for (u,v,c) in self.bundles() {
      r.add_edges(inv[u as usize], inv[v as usize], c); }
    r }}

impl fmt::Display for Graph {
  /// the same comma list the parser reads.
  fn fmt(&self, f:&mut fmt::Formatter)->fmt::Result {
    let mut first = true;
    for (u,v,c) in self.bundles() {
      for _ in 0..c {
        if !first { write!(f, ",")?; }
        write!(f, "{}--{}", u, v)?;
        first = false; }}
    Ok(()) }}


// -- tests ----------------------------------------------------------

#[cfg(test)]
fn path3()->Graph { let mut g = Graph::new(3); g.add_edge(0,1); g.add_edge(1,2); g }

#[cfg(test)]
fn triangle()->Graph { let mut g = path3(); g.add_edge(2,0); g }

#[test] fn test_add_remove() {
  let mut g = Graph::new(2);
  g.add_edges(0,1,3);
  assert_eq!(g.num_edges(), 3);
  assert_eq!(g.multiplicity(0,1), 3);
  assert_eq!(g.multiplicity(1,0), 3);
  g.remove_edge(0,1).unwrap();
  assert_eq!(g.multiplicity(0,1), 2);
  g.add_edge(0,1);
  assert_eq!(g.multiplicity(0,1), 3); // removing then re-adding restores the count
  g.remove_all_edges(0,1);
  assert_eq!(g.num_edges(), 0);
  assert!(g.remove_edge(0,1).is_err()) }

#[test] fn test_contract_keeps_loops() {
  // double edge: contracting one copy leaves one loop behind
  let mut g = Graph::new(2);
  g.add_edges(0,1,2);
  g.contract_edge(0,1,1).unwrap();
  assert_eq!(g.num_vertices(), 1);
  assert_eq!(g.multiplicity(0,0), 1);
  assert_eq!(g.num_edges(), 1) }

#[test] fn test_contract_merges_neighbours() {
  // triangle with a doubled 0--1: contract the whole bundle
  let mut g = triangle();
  g.add_edge(0,1);
  g.contract_edge(0,1,2).unwrap();
  assert_eq!(g.num_vertices(), 2);
  assert_eq!(g.multiplicity(0,2), 2); // 0--2 and 1--2 merged
  assert_eq!(g.multiplicity(0,0), 0) }

#[test] fn test_simple_contract_coalesces() {
  let mut g = triangle();
  g.simple_contract_edge(0,1).unwrap();
  assert_eq!(g.num_vertices(), 2);
  assert_eq!(g.multiplicity(0,2), 1); // parallels coalesce, no loop kept
  assert_eq!(g.num_edges(), 1) }

#[test] fn test_predicates() {
  assert!(path3().is_tree());
  assert!(path3().is_multitree());
  assert!(!triangle().is_multitree());
  assert!(triangle().is_multicycle());
  assert!(triangle().is_biconnected());
  let mut dbl = Graph::new(2); dbl.add_edges(0,1,2);
  assert!(dbl.is_multitree()); // underlying single edge is a forest
  assert!(!dbl.is_tree());
  assert!(!dbl.is_multicycle());
  let mut lp = Graph::new(1); lp.add_edge(0,0);
  assert!(lp.is_loop());
  assert!(!lp.is_multitree()) }

#[test] fn test_reduce_loops() {
  let mut g = triangle();
  g.add_edges(1,1,2);
  g.add_edge(2,2);
  assert_eq!(g.reduce_loops(), 3);
  assert_eq!(g, triangle()) }

#[test] fn test_bowtie_extraction() {
  // two triangles sharing vertex 2
  let mut g = triangle();
  let mut g5 = Graph::new(5);
  for (u,v,c) in g.bundles() { g5.add_edges(u,v,c) }
  g5.add_edge(2,3); g5.add_edge(3,4); g5.add_edge(4,2);
  g = g5;
  assert!(!g.is_biconnected());
  let comps = g.extract_biconnected_components();
  assert_eq!(comps.len(), 2);
  for c in &comps {
    assert_eq!(c.num_vertices(), 3);
    assert!(c.is_multicycle()) }
  assert_eq!(g.num_edges(), 0) }

#[test] fn test_bridge_bundle_stays() {
  // triangle -- double bridge -- triangle: the doubled bridge is not
  // extracted, both triangles are
  let mut g = Graph::new(6);
  g.add_edge(0,1); g.add_edge(1,2); g.add_edge(2,0);
  g.add_edges(2,3,2);
  g.add_edge(3,4); g.add_edge(4,5); g.add_edge(5,3);
  let comps = g.extract_biconnected_components();
  assert_eq!(comps.len(), 2);
  assert_eq!(g.num_edges(), 2);
  assert_eq!(g.multiplicity(2,3), 2);
  assert!(g.is_multitree()) }

#[test] fn test_compact_and_permute() {
  let mut g = Graph::new(6);
  g.add_edge(1,3); g.add_edge(3,5);
  let c = g.compact();
  assert_eq!(c.num_vertices(), 3);
  assert_eq!(c.num_edges(), 2);
  let p = c.permuted(&[2,1,0]);
  assert_eq!(p.num_edges(), 2);
  assert_eq!(p.multiplicity(2,1) + p.multiplicity(1,0), 2) }
