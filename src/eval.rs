//! The deletion-contraction engine.
//!
//! All three recurrences (Tutte, chromatic, flow) share one skeleton:
//! strip self-loops into a y-power factor, probe the cache by
//! canonical key, then either close the graph out with a structural
//! shortcut (multicycle, multitree, biconnected decomposition) or pick
//! an edge bundle and recurse on its deletion and contraction.
//! Results are cached before the loop factor is applied.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use crate::cache::Cache;
use crate::canon::GraphKey;
use crate::error::{Error, Result};
use crate::graph::{Graph, Vert};
use crate::poly::{FactorPoly, Mono, Terms};
use crate::tree::TreeWriter;

/// which polynomial the recursion computes.  Chromatic and flow reuse
/// the Tutte shape; the driver applies the sign/substitution identity
/// to the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode { Tutte, Chromatic, Flow }

/// how the pivot bundle of a delete/contract step is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSel {
  /// first bundle in vertex-index order.
  VertexOrder,
  /// extremal endpoint underlying-degree sum.
  MinDeg, MaxDeg,
  /// maximal complement of the smaller endpoint degree.
  MinSDeg,
  /// extremal endpoint underlying-degree product.
  MinMDeg, MaxMDeg,
  /// uniform over edges, weighted by multiplicity.
  Random }

/// optional relabelling applied to the input before evaluation; it
/// moves cache hit rates around but never the polynomial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertOrder { None, Random, MinDeg, MaxDeg, MinUDeg, MaxUDeg }

#[derive(Clone, Debug, Default)]
pub struct Stats {
  pub steps: u64,
  pub bicomps: u64,
  pub disbicomps: u64,
  pub cycles: u64,
  pub trees: u64,
  /// cache hits indexed by graph vertex count.
  pub hit_sizes: Vec<u64> }

impl Stats {
  pub fn reset(&mut self) { *self = Stats::default(); }}

/// about half a year, in seconds; effectively "no timeout".
pub const DEFAULT_TIMEOUT: i64 = 15_768_000;
const STATUS_INTERVAL: i64 = 5;

pub struct Engine {
  pub cache: Cache,
  pub heuristic: EdgeSel,
  /// below this vertex count the cache is not consulted.
  pub small_graph: u32,
  /// delete/contract whole parallel bundles rather than single copies.
  pub reduce_multiedges: bool,
  /// close multicycles out with the dedicated routine.
  pub reduce_multicycles: bool,
  pub stats: Stats,
  pub tree: Option<TreeWriter>,
  tree_id: u32,
  rng: StdRng,
  status: Arc<AtomicBool>,
  remaining: Arc<AtomicI64>,
  last_steps: u64 }

impl Engine {
  pub fn new(cache: Cache)->Engine {
    Engine { cache,
             heuristic: EdgeSel::VertexOrder,
             small_graph: 5,
             reduce_multiedges: true,
             reduce_multicycles: true,
             stats: Stats::default(),
             tree: None,
             tree_id: 2,
             rng: StdRng::from_entropy(),
             status: Arc::new(AtomicBool::new(false)),
             remaining: Arc::new(AtomicI64::new(DEFAULT_TIMEOUT)),
             last_steps: 0 }}

  /// wall-clock budget for the next evaluation, in seconds.
  pub fn set_timeout(&self, secs: i64) { self.remaining.store(secs, Ordering::Relaxed); }
  pub fn remaining(&self)->i64 { self.remaining.load(Ordering::Relaxed) }
  pub fn timed_out(&self)->bool { self.remaining() <= 0 }

  /// Detached ticker.  It only flips the status flag and decrements
  /// the remaining-seconds counter; the evaluator observes both at
  /// recursion entry.
  pub fn spawn_status_timer(&self) {
    let status = self.status.clone();
    let remaining = self.remaining.clone();
    std::thread::spawn(move || loop {
      std::thread::sleep(std::time::Duration::from_secs(STATUS_INTERVAL as u64));
      status.store(true, Ordering::Relaxed);
      remaining.fetch_sub(STATUS_INTERVAL, Ordering::Relaxed); }); }

  fn print_status(&mut self) {
    let rate = (self.stats.steps - self.last_steps) / STATUS_INTERVAL as u64;
    let cf = 100.0 * self.cache.size() as f64 / self.cache.capacity().max(1) as f64;
    info!("completed {} graphs at a rate of {}/s, cache is {:.1}% full",
          self.stats.steps, rate, cf);
    self.last_steps = self.stats.steps; }

  /// Evaluate a graph.  The graph is consumed structurally: deletion
  /// happens in place and contraction on a clone, exactly one level of
  /// copying per delete/contract step.
  pub fn eval(&mut self, g:&mut Graph, mode: Mode)->Result<FactorPoly> {
    self.tree_id = 2;
    self.eval_at(g, 1, mode) }

  fn eval_at(&mut self, g:&mut Graph, mid: u32, mode: Mode)->Result<FactorPoly> {
    if self.timed_out() { return Ok(FactorPoly::zero()) }
    if self.status.swap(false, Ordering::Relaxed) { self.print_status(); }
    self.stats.steps += 1;

    // self-loops leave as a y^L factor; the chromatic recurrence never
    // sees loops (the driver pre-checks them to zero).
    let rf = match mode {
      Mode::Chromatic => None,
      _ => match g.reduce_loops() { 0 => None, l => Some(Mono::y(l as u32)) }};

    let cacheable = g.num_vertices() >= self.small_graph &&
      (mode == Mode::Chromatic || !g.is_multitree());
    let mut key: Option<Vec<u8>> = None;
    if cacheable {
      let k = GraphKey::build(g).to_bytes();
      if let Some((hit, match_id)) = self.cache.lookup(&k)? {
        if let Some(t) = &self.tree { t.write_match(mid, match_id, g); }
        let nv = g.num_vertices() as usize;
        if self.stats.hit_sizes.len() <= nv { self.stats.hit_sizes.resize(nv+1, 0); }
        self.stats.hit_sizes[nv] += 1;
        return Ok(apply_factor(hit, rf)) }
      key = Some(k); }

    let (poly, storable) = match mode {
      Mode::Tutte => self.tutte_body(g, mid)?,
      Mode::Flow => self.flow_body(g, mid)?,
      Mode::Chromatic => self.chromatic_body(g, mid)? };

    if storable && !self.timed_out() {
      if let Some(k) = key { self.cache.store(&k, &poly, mid)?; }}
    Ok(apply_factor(poly, rf)) }

  fn tutte_body(&mut self, g:&mut Graph, mid: u32)->Result<(FactorPoly, bool)> {
    let seed = Terms::x(1);
    if self.reduce_multicycles && g.is_multicycle() {
      self.stats.cycles += 1;
      if let Some(t) = &self.tree { t.leaf(mid, g); }
      return Ok((reduce_cycle(&seed, g), true)) }

    if !g.is_biconnected() {
      let comps = g.extract_biconnected_components();
      let tid = self.alloc_split_ids(mid, &comps, g);
      if g.is_multitree() { self.stats.trees += 1; }
      if comps.len() > 1 { self.stats.disbicomps += 1; }
      let mut poly = reduce_tree(&seed, g);
      let mut t = tid;
      for mut c in comps {
        self.stats.bicomps += 1;
        if self.reduce_multicycles && c.is_multicycle() {
          self.stats.cycles += 1;
          if let Some(w) = &self.tree { w.leaf(t, &c); }
          poly = poly * reduce_cycle(&seed, &c); }
        else {
          poly = poly * self.eval_at(&mut c, t, Mode::Tutte)?; }
        t += 1; }
      return Ok((poly, true)) }

    let (lid, rid) = self.alloc_branch_ids(mid, g);
    let mut g2 = g.clone();
    let (u,v,k) = self.select_edge(g)?;
    g.remove_edges(u,v,k)?;
    g2.contract_edge(u,v,k)?;
    let deleted = self.eval_at(g, lid, Mode::Tutte)?;
    let contracted = self.eval_at(&mut g2, rid, Mode::Tutte)?;
    let poly = if k > 1 {
      deleted + contracted.base_mul(&Terms::y_run(0, k-1)) }
    else { deleted + contracted };
    Ok((poly, true)) }

  fn flow_body(&mut self, g:&mut Graph, mid: u32)->Result<(FactorPoly, bool)> {
    let seed = Terms::zero();
    if self.reduce_multicycles && g.is_multicycle() {
      self.stats.cycles += 1;
      if let Some(t) = &self.tree { t.leaf(mid, g); }
      return Ok((reduce_cycle(&seed, g), true)) }

    if !g.is_biconnected() {
      let comps = g.extract_biconnected_components();
      let tid = self.alloc_split_ids(mid, &comps, g);
      // a single-copy bridge admits no nowhere-zero flow at all
      if g.bundles().any(|(_,_,c)| c == 1) {
        self.stats.trees += 1;
        if let Some(t) = &self.tree { t.leaf(mid, g); }
        return Ok((FactorPoly::zero(), false)) }
      if g.is_multitree() { self.stats.trees += 1; }
      if comps.len() > 1 { self.stats.disbicomps += 1; }
      let mut poly = reduce_tree(&seed, g);
      let mut t = tid;
      for mut c in comps {
        self.stats.bicomps += 1;
        if self.reduce_multicycles && c.is_multicycle() {
          self.stats.cycles += 1;
          if let Some(w) = &self.tree { w.leaf(t, &c); }
          poly = poly * reduce_cycle(&seed, &c); }
        else {
          poly = poly * self.eval_at(&mut c, t, Mode::Flow)?; }
        t += 1; }
      return Ok((poly, true)) }

    let (lid, rid) = self.alloc_branch_ids(mid, g);
    let mut g2 = g.clone();
    let (u,v,k) = self.select_edge(g)?;
    g.remove_edges(u,v,k)?;
    g2.contract_edge(u,v,k)?;
    let deleted = self.eval_at(g, lid, Mode::Flow)?;
    let contracted = self.eval_at(&mut g2, rid, Mode::Flow)?;
    let poly = if k > 1 {
      deleted + contracted.base_mul(&Terms::y_run(0, k-1)) }
    else { deleted + contracted };
    Ok((poly, true)) }

  fn chromatic_body(&mut self, g:&mut Graph, mid: u32)->Result<(FactorPoly, bool)> {
    if !g.is_biconnected() {
      let comps = g.extract_biconnected_components();
      let tid = self.alloc_split_ids(mid, &comps, g);
      if g.is_multitree() { self.stats.trees += 1; }
      if comps.len() > 1 { self.stats.disbicomps += 1; }
      // every residual bridge is a factor of x; multiplicities never
      // matter for colourings
      let mut poly = FactorPoly::from_terms(Terms::x(g.num_underlying_edges() as u32));
      let mut t = tid;
      for mut c in comps {
        self.stats.bicomps += 1;
        poly = poly * self.eval_at(&mut c, t, Mode::Chromatic)?;
        t += 1; }
      // only delete/contract results are worth caching here
      return Ok((poly, false)) }

    let (lid, rid) = self.alloc_branch_ids(mid, g);
    let mut g2 = g.clone();
    let (u,v,k) = self.select_edge(g)?;
    g.remove_edges(u,v,k)?;
    g2.simple_contract_edge(u,v)?;
    let deleted = self.eval_at(g, lid, Mode::Chromatic)?;
    let contracted = self.eval_at(&mut g2, rid, Mode::Chromatic)?;
    Ok((deleted + contracted, true)) }

  fn alloc_split_ids(&mut self, mid: u32, comps:&[Graph], g:&Graph)->u32 {
    let tid = self.tree_id;
    self.tree_id += comps.len() as u32;
    if let Some(t) = &self.tree {
      if comps.is_empty() { t.leaf(mid, g); }
      else { t.nonleaf(mid, tid, comps.len() as u32, g); }}
    tid }

  fn alloc_branch_ids(&mut self, mid: u32, g:&Graph)->(u32, u32) {
    let (lid, rid) = (self.tree_id, self.tree_id + 1);
    self.tree_id += 2;
    if let Some(t) = &self.tree { t.nonleaf(mid, lid, 2, g); }
    (lid, rid) }

  /// Choose the pivot bundle.  Maximisation keeps the first best on
  /// ties; the random heuristic lands a pre-sampled weighted index
  /// inside some bundle.
  pub fn select_edge(&mut self, g:&Graph)->Result<(Vert, Vert, u32)> {
    let vcount = g.num_vertices() as u64;
    let mut best = 0u64;
    let mut r: Option<(Vert, Vert, u32)> = None;
    let mut rcount = 0u64;
    let rtarget = if self.heuristic == EdgeSel::Random {
      self.rng.gen_range(0..g.num_edges().max(1)) } else { 0 };

    for u in g.verts() {
      let uc = g.num_underlying_at(u) as u64;
      for (w,c) in g.edges_at(u) {
        if u >= w { continue } // each bundle once; loops are never pivots
        let wc = g.num_underlying_at(w) as u64;
        let take = if self.reduce_multiedges { c } else { 1 };
        let cost = match self.heuristic {
          EdgeSel::VertexOrder => return Ok((u, w, take)),
          EdgeSel::Random => {
            if rtarget < rcount + c as u64 { return Ok((u, w, take)) }
            rcount += c as u64;
            0 }
          EdgeSel::MaxDeg => uc + wc,
          EdgeSel::MaxMDeg => uc * wc,
          EdgeSel::MinDeg => 2*vcount - (uc + wc),
          EdgeSel::MinSDeg => vcount - uc.min(wc),
          EdgeSel::MinMDeg => vcount*vcount - uc*wc };
        if cost > best { best = cost; r = Some((u, w, take)); }}}

    r.ok_or(Error::Internal("select_edge: no eligible edge")) }

  /// relabel a compacted input graph by the vertex-ordering heuristic.
  pub fn permute(&mut self, g:&Graph, h: VertOrder)->Graph {
    let mut order: Vec<Vert> = g.verts().collect();
    match h {
      VertOrder::None => return g.clone(),
      VertOrder::Random => order.shuffle(&mut self.rng),
      VertOrder::MinDeg => order.sort_by_key(|&v| g.num_edges_at(v)),
      VertOrder::MaxDeg => order.sort_by_key(|&v| std::cmp::Reverse(g.num_edges_at(v))),
      VertOrder::MinUDeg => order.sort_by_key(|&v| g.num_underlying_at(v)),
      VertOrder::MaxUDeg => order.sort_by_key(|&v| std::cmp::Reverse(g.num_underlying_at(v))) }
    g.permuted(&order) }}

#[inline] fn apply_factor(p: FactorPoly, rf: Option<Mono>)->FactorPoly {
  match rf { Some(m) => p.scaled(m), None => p }}

/// a bridge bundle of multiplicity m: seed + y + ... + y^(m-1).  The
/// seed is x for Tutte and zero for flow.
fn bridge_factor(seed:&Terms, m: u32)->Terms {
  let mut b = seed.clone();
  if m > 1 { b.add(&Terms::y_run(1, m-2)); }
  b }

/// a forest of multitrees is a product of bridge factors.
pub fn reduce_tree(seed:&Terms, g:&Graph)->FactorPoly {
  let mut t = Terms::one();
  for (_,_,c) in g.bundles() { t = t.mul(&bridge_factor(seed, c)); }
  FactorPoly::from_terms(t) }

/// Closed form for a multicycle.  With cyclic bundle multiplicities
/// m1..mn, shrinking the cycle one bundle at a time gives
///   T[n-1] = b(m[n-1] + m[n])
///   T[i]   = b(m[i+1])*...*b(m[n]) + (1 + y + ... + y^(m[i]-1)) * T[i+1]
/// where b is the bridge factor; the answer is T[1].
pub fn reduce_cycle(seed:&Terms, g:&Graph)->FactorPoly {
  let start = g.verts().next().expect("multicycle has vertices");
  let mut ms: Vec<u32> = vec![];
  let (mut prev, mut cur) = (start, start);
  loop {
    let w = g.edges_at(cur).map(|(w,_)| w).find(|&w| w != prev)
      .expect("multicycle vertices have two neighbours");
    ms.push(g.multiplicity(cur, w));
    prev = cur; cur = w;
    if cur == start { break }}

  let n = ms.len();
  debug_assert!(n >= 3);
  let mut acc = bridge_factor(seed, ms[n-2] + ms[n-1]);
  let mut suffix = bridge_factor(seed, ms[n-2]).mul(&bridge_factor(seed, ms[n-1]));
  for i in (0..n-2).rev() {
    let mut t = suffix.clone();
    t.add(&Terms::y_run(0, ms[i]-1).mul(&acc));
    acc = t;
    if i > 0 { suffix = suffix.mul(&bridge_factor(seed, ms[i])); }}
  FactorPoly::from_terms(acc) }


// -- tests ----------------------------------------------------------

#[cfg(test)] use num_bigint::BigInt;
#[cfg(test)] use num_traits::Zero;

#[cfg(test)]
fn engine()->Engine { Engine::new(Cache::new(1<<20, 1024)) }

#[cfg(test)]
fn build(edges:&[(u32,u32)])->Graph {
  let n = edges.iter().map(|&(u,v)| u.max(v)).max().map(|m| m+1).unwrap_or(0);
  let mut g = Graph::new(n as usize);
  for &(u,v) in edges { g.add_edge(u,v); }
  g }

#[cfg(test)]
fn tutte_of(edges:&[(u32,u32)])->FactorPoly {
  engine().eval(&mut build(edges), Mode::Tutte).unwrap() }

#[cfg(test)]
fn terms_of(spec:&[(u64,u32,u32)])->Terms {
  let mut t = Terms::zero();
  for &(c,xp,yp) in spec {
    t.add_term(Mono { xp, yp }, num_bigint::BigUint::from(c)); }
  t }

#[test] fn test_boundary_graphs() {
  assert_eq!(tutte_of(&[]).expand(), Terms::one());          // empty graph
  assert_eq!(tutte_of(&[(0,1)]).to_string(), "x");           // single edge
  let mut lp = Graph::new(1); lp.add_edge(0,0);
  assert_eq!(engine().eval(&mut lp, Mode::Tutte).unwrap().to_string(), "y") }

#[test] fn test_small_scenarios() {
  assert_eq!(tutte_of(&[(0,1),(1,2)]).to_string(), "x^2");
  assert_eq!(tutte_of(&[(0,1),(1,2),(2,0)]).to_string(), "x^2 + x + y");
  assert_eq!(tutte_of(&[(0,1),(0,1)]).to_string(), "x + y");
  assert_eq!(tutte_of(&[(0,1),(1,2),(2,3),(3,0)]).to_string(), "x^3 + x^2 + x + y") }

#[test] fn test_k4() {
  let k4 = [(0,1),(0,2),(0,3),(1,2),(1,3),(2,3)];
  let t = tutte_of(&k4);
  let want = terms_of(&[(1,3,0),(3,2,0),(2,1,0),(4,1,1),(2,0,1),(3,0,2),(1,0,3)]);
  assert_eq!(t.expand(), want);
  assert_eq!(t.substitute(1,1), BigInt::from(16));
  assert_eq!(t.substitute(2,2), BigInt::from(64)) }

#[test] fn test_signed_power_of_two() {
  // T(-1,-1) is always +-2^k
  for edges in [&[(0,1),(1,2),(2,0)][..],
                &[(0,1),(0,2),(0,3),(1,2),(1,3),(2,3)][..],
                &[(0,1),(1,2),(2,3),(3,0),(0,2)][..]] {
    let v = tutte_of(edges).substitute(-1,-1);
    let mut m = if v < BigInt::zero() { -v } else { v };
    assert!(!m.is_zero());
    while (&m % 2u8).is_zero() { m /= 2u8; }
    assert_eq!(m, BigInt::from(1)); }}

#[test] fn test_t22_counts_subgraphs() {
  // T(2,2) = 2^|E|
  for (edges, e) in [(&[(0,1),(1,2),(2,0)][..], 3u32),
                     (&[(0,1),(0,1),(1,2)][..], 3u32),
                     (&[(0,1),(1,2),(2,3),(3,0),(0,2)][..], 5u32)] {
    assert_eq!(tutte_of(edges).substitute(2,2), BigInt::from(1u64 << e)); }}

#[test] fn test_multicycle_closed_form() {
  // triangle with one doubled edge
  let t = tutte_of(&[(0,1),(0,1),(1,2),(2,0)]);
  let want = terms_of(&[(1,2,0),(1,1,0),(1,1,1),(1,0,1),(1,0,2)]);
  assert_eq!(t.expand(), want) }

#[test] fn test_multicycle_agrees_with_recursion() {
  let edges = [(0,1),(0,1),(1,2),(2,0)];
  let shortcut = tutte_of(&edges);
  let mut e = engine();
  e.reduce_multicycles = false;
  e.reduce_multiedges = false;
  let longhand = e.eval(&mut build(&edges), Mode::Tutte).unwrap();
  assert_eq!(shortcut.expand(), longhand.expand()) }

#[test] fn test_disconnected_is_product() {
  let two = tutte_of(&[(0,1),(1,2),(2,0),(3,4),(4,5),(5,3)]);
  let tri = tutte_of(&[(0,1),(1,2),(2,0)]);
  assert_eq!(two.expand(), (tri.clone() * tri).expand()) }

#[test] fn test_relabelling_invariance() {
  let house = [(0,1),(1,2),(2,3),(3,4),(4,0),(0,2)];
  let base = tutte_of(&house).expand();
  let g = build(&house);
  let mut e = engine();
  for h in [VertOrder::MaxUDeg, VertOrder::MinDeg, VertOrder::Random] {
    let mut p = e.permute(&g, h);
    let t = engine().eval(&mut p, Mode::Tutte).unwrap();
    assert_eq!(t.expand(), base); }}

#[test] fn test_heuristics_agree() {
  let house = [(0,1),(1,2),(2,3),(3,4),(4,0),(0,2)];
  let base = tutte_of(&house).expand();
  for h in [EdgeSel::MinDeg, EdgeSel::MaxDeg, EdgeSel::MinSDeg,
            EdgeSel::MinMDeg, EdgeSel::MaxMDeg, EdgeSel::Random] {
    let mut e = engine();
    e.heuristic = h;
    let t = e.eval(&mut build(&house), Mode::Tutte).unwrap();
    assert_eq!(t.expand(), base, "heuristic {:?}", h); }}

#[test] fn test_cache_reuse_between_runs() {
  // 5 vertices crosses the caching threshold
  let house = [(0,1),(1,2),(2,3),(3,4),(4,0),(0,2)];
  let mut e = engine();
  let first = e.eval(&mut build(&house), Mode::Tutte).unwrap();
  assert!(e.cache.num_entries() > 0);
  let before = e.cache.num_hits();
  let second = e.eval(&mut build(&house), Mode::Tutte).unwrap();
  assert!(e.cache.num_hits() > before);
  assert_eq!(first.expand(), second.expand()) }

#[test] fn test_chromatic_triangle() {
  // P(G;k) = (-1)^(V-C) * k * Q(1-k) should count proper colourings
  let q = engine().eval(&mut build(&[(0,1),(1,2),(2,0)]), Mode::Chromatic).unwrap();
  for k in [2i64, 3, 4] {
    let want = BigInt::from(k*(k-1)*(k-2));
    assert_eq!(BigInt::from(k) * q.substitute(1-k, 0), want); }}

#[test] fn test_chromatic_ignores_multiplicity() {
  let q1 = engine().eval(&mut build(&[(0,1),(1,2),(2,0)]), Mode::Chromatic).unwrap();
  let q2 = engine().eval(&mut build(&[(0,1),(0,1),(1,2),(2,0)]), Mode::Chromatic).unwrap();
  assert_eq!(q1.substitute(-2,0), q2.substitute(-2,0)) }

#[test] fn test_flow_values() {
  // a lone bridge kills the flow polynomial outright
  assert!(engine().eval(&mut build(&[(0,1)]), Mode::Flow).unwrap().is_zero());
  // C4: F(k) = k-1, via F(k) = (-1)^(E-V+C) * Q(0, 1-k)
  let q = engine().eval(&mut build(&[(0,1),(1,2),(2,3),(3,0)]), Mode::Flow).unwrap();
  assert_eq!(q.to_string(), "y");
  for k in [2i64, 3, 5] {
    assert_eq!(-q.substitute(0, 1-k), BigInt::from(k-1)); }
  // doubled edge behaves the same way
  let q2 = engine().eval(&mut build(&[(0,1),(0,1)]), Mode::Flow).unwrap();
  assert_eq!(-q2.substitute(0, 1-5), BigInt::from(4)) }

#[test] fn test_timeout_yields_zero() {
  let mut e = engine();
  e.set_timeout(0);
  let t = e.eval(&mut build(&[(0,1),(1,2),(2,0)]), Mode::Tutte).unwrap();
  assert!(t.is_zero()) }

#[test] fn test_loops_multiply_in() {
  // triangle plus two loops: y^2 * (x^2 + x + y)
  let mut g = build(&[(0,1),(1,2),(2,0)]);
  g.add_edge(1,1); g.add_edge(2,2);
  let t = engine().eval(&mut g, Mode::Tutte).unwrap();
  let want = terms_of(&[(1,2,2),(1,1,2),(1,0,3)]);
  assert_eq!(t.expand(), want) }

#[test] fn test_select_edge_errors_on_empty() {
  let mut e = engine();
  assert!(e.select_edge(&Graph::new(3)).is_err()) }
