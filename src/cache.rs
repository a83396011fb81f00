//! The computation cache: canonical key -> serialized polynomial.
//!
//! All entries live in one contiguous byte arena.  A node is a fixed
//! header, the key bytes, then the bincode polynomial payload; nodes
//! chain into hash buckets through 32-bit *offsets* into the arena, so
//! the whole store can be copied or compacted with nothing but byte
//! moves and integer fix-ups.  A node whose links are both null is
//! free; the compactor slides live nodes left over the gaps.
//!
//! Allocation bumps a pointer.  When a store does not fit, an eviction
//! sweep (by hit count, or random) unlinks victims until the requested
//! fraction of the arena is free, then the arena is packed.
use num_traits::ToPrimitive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::canon::{hash_key, real_vertices};
use crate::error::{Error, Result};
use crate::poly::FactorPoly;

/// no node.
const NULL: u32 = u32::MAX;
/// marks the first node of a bucket; its predecessor is the bucket
/// head slot, not another node.
const HEAD: u32 = u32::MAX - 1;

/// header layout: next, prev, hit count, producer id, node size, key
/// length -- six little-endian u32 fields.
const HDR: usize = 24;
const O_NEXT: usize = 0;
const O_PREV: usize = 4;
const O_HITS: usize = 8;
const O_ID: usize = 12;
const O_SIZE: usize = 16;
const O_KLEN: usize = 20;

pub struct Cache {
  buf: Vec<u8>,
  /// bump pointer; everything at and beyond it is unused.
  next: usize,
  buckets: Vec<u32>,
  hits: u64,
  misses: u64,
  collisions: u64,
  entries: u64,
  /// fraction of the arena an eviction sweep tries to free.
  replacement: f64,
  random_replacement: bool,
  /// entries whose key has at least this many real vertices survive
  /// eviction; the big graphs are the expensive ones.
  min_replace_size: u64,
  rng: StdRng }

impl Cache {
  pub fn new(capacity: usize, nbuckets: usize)->Cache {
    assert!(nbuckets > 0);
    let capacity = capacity.min((NULL - 2) as usize);
    Cache { buf: vec![0; capacity], next: 0,
            buckets: vec![NULL; nbuckets],
            hits: 0, misses: 0, collisions: 0, entries: 0,
            replacement: 0.3, random_replacement: false,
            min_replace_size: u64::MAX,
            rng: StdRng::from_entropy() }}

  // -- field access on raw nodes -----------------------------------

  #[inline] fn get32(&self, off: usize)->u32 {
    u32::from_le_bytes([self.buf[off], self.buf[off+1], self.buf[off+2], self.buf[off+3]]) }

  #[inline] fn put32(&mut self, off: usize, val: u32) {
    self.buf[off..off+4].copy_from_slice(&val.to_le_bytes()); }

  #[inline] fn node_size(&self, off: usize)->usize { self.get32(off + O_SIZE) as usize }
  #[inline] fn is_free(&self, off: usize)->bool {
    self.get32(off + O_NEXT) == NULL && self.get32(off + O_PREV) == NULL }

  fn key_at(&self, off: usize)->&[u8] {
    let klen = self.get32(off + O_KLEN) as usize;
    &self.buf[off+HDR .. off+HDR+klen] }

  fn payload_at(&self, off: usize)->&[u8] {
    let klen = self.get32(off + O_KLEN) as usize;
    let size = self.node_size(off);
    &self.buf[off+HDR+klen .. off+size] }

  #[inline] fn bucket_index(&self, key:&[u8])->usize {
    (hash_key(key) % self.buckets.len() as u64) as usize }

  // -- chain manipulation ------------------------------------------

  fn link_front(&mut self, bucket: usize, off: u32) {
    let old = self.buckets[bucket];
    self.put32(off as usize + O_NEXT, old);
    self.put32(off as usize + O_PREV, HEAD);
    if old != NULL { self.put32(old as usize + O_PREV, off); }
    self.buckets[bucket] = off; }

  /// detach a node from its bucket, leaving both links null (the free
  /// mark the compactor looks for).
  fn unlink(&mut self, off: u32) {
    let next = self.get32(off as usize + O_NEXT);
    let prev = self.get32(off as usize + O_PREV);
    if prev == HEAD {
      let b = self.bucket_index(self.key_at(off as usize));
      self.buckets[b] = next; }
    else {
      self.put32(prev as usize + O_NEXT, next); }
    if next != NULL { self.put32(next as usize + O_PREV, prev); }
    self.put32(off as usize + O_NEXT, NULL);
    self.put32(off as usize + O_PREV, NULL); }

  // -- the public face ---------------------------------------------

  /// Probe for a key.  A hit deserializes the payload, bumps the
  /// node's hit count, and splices it to the front of its bucket.
  pub fn lookup(&mut self, key:&[u8])->Result<Option<(FactorPoly, u32)>> {
    let bucket = self.bucket_index(key);
    let mut off = self.buckets[bucket];
    while off != NULL {
      if self.key_at(off as usize) == key {
        let poly: FactorPoly = bincode::deserialize(self.payload_at(off as usize))
          .map_err(|_| Error::Internal("undecodable cache payload"))?;
        let id = self.get32(off as usize + O_ID);
        let h = self.get32(off as usize + O_HITS);
        self.put32(off as usize + O_HITS, h.saturating_add(1));
        self.unlink(off);
        self.link_front(bucket, off);
        self.hits += 1;
        return Ok(Some((poly, id))) }
      self.collisions += 1;
      off = self.get32(off as usize + O_NEXT); }
    self.misses += 1;
    Ok(None) }

  /// Insert an entry, evicting and compacting as needed.
  pub fn store(&mut self, key:&[u8], poly:&FactorPoly, id:u32)->Result<()> {
    let payload = bincode::serialize(poly)
      .map_err(|_| Error::Internal("unencodable polynomial"))?;
    let size = HDR + key.len() + payload.len();
    let off = self.alloc(size)?;
    self.put32(off + O_HITS, 0);
    self.put32(off + O_ID, id);
    self.put32(off + O_SIZE, size as u32);
    self.put32(off + O_KLEN, key.len() as u32);
    self.buf[off+HDR .. off+HDR+key.len()].copy_from_slice(key);
    self.buf[off+HDR+key.len() .. off+size].copy_from_slice(&payload);
    let bucket = self.bucket_index(key);
    self.link_front(bucket, off as u32);
    self.entries += 1;
    Ok(()) }

  fn alloc(&mut self, size: usize)->Result<usize> {
    if size >= self.buf.len() { return Err(Error::OutOfMemory(size)) }
    while self.next + size > self.buf.len() {
      let freed = if self.random_replacement { self.evict_random() }
                  else { self.evict_unused() };
      self.pack();
      if freed == 0 && self.next + size > self.buf.len() {
        return Err(Error::OutOfMemory(size)) }}
    let r = self.next;
    self.next += size;
    Ok(r) }

  /// unlink nodes below an increasing hit-count threshold until the
  /// target fraction of the arena is free.
  fn evict_unused(&mut self)->usize {
    let orig = self.next;
    let mut freed = 0usize;
    let mut hc = 0u32;
    loop {
      hc += 1;
      let mut max_hits = 0u32;
      let mut off = 0usize;
      while off != self.next {
        let size = self.node_size(off);
        if !self.is_free(off) {
          let n = real_vertices(self.key_at(off));
          let h = self.get32(off + O_HITS);
          max_hits = max_hits.max(h);
          if h < hc && n < self.min_replace_size {
            self.unlink(off as u32);
            self.entries -= 1;
            freed += size; }}
        off += size; }
      if freed as f64 / orig as f64 >= self.replacement { break }
      if hc > max_hits { break }}
    freed }

  /// unlink each node with probability equal to the replacement ratio.
  fn evict_random(&mut self)->usize {
    let mut freed = 0usize;
    let mut off = 0usize;
    while off != self.next {
      let size = self.node_size(off);
      if !self.is_free(off) {
        let n = real_vertices(self.key_at(off));
        if n < self.min_replace_size && self.rng.gen::<f64>() < self.replacement {
          self.unlink(off as u32);
          self.entries -= 1;
          freed += size; }}
      off += size; }
    freed }

  /// Slide live nodes left over freed gaps.  Each move rewrites the
  /// two links that point at the moved node; a moved node's own link
  /// fields stay valid because its neighbours fix them when they move
  /// in turn.
  fn pack(&mut self) {
    let mut diff = 0usize;
    let mut off = 0usize;
    while off != self.next {
      let size = self.node_size(off);
      if self.is_free(off) { diff += size; }
      else if diff > 0 {
        let dst = (off - diff) as u32;
        let next = self.get32(off + O_NEXT);
        let prev = self.get32(off + O_PREV);
        if prev == HEAD {
          let b = self.bucket_index(self.key_at(off));
          self.buckets[b] = dst; }
        else { self.put32(prev as usize + O_NEXT, dst); }
        if next != NULL { self.put32(next as usize + O_PREV, dst); }
        self.buf.copy_within(off..off+size, dst as usize); }
      off += size; }
    self.next -= diff; }

  /// Re-hash every live node into a fresh bucket array.  The arena
  /// itself does not move.
  pub fn rebucket(&mut self, nbuckets: usize) {
    assert!(nbuckets > 0);
    let mut live = vec![];
    let mut off = 0usize;
    while off != self.next {
      if !self.is_free(off) { live.push(off as u32); }
      off += self.node_size(off); }
    self.buckets = vec![NULL; nbuckets];
    for off in live {
      let b = self.bucket_index(self.key_at(off as usize));
      self.link_front(b, off); }}

  /// Swap in an arena of a different capacity.  Links are offsets, so
  /// the content copies verbatim.
  pub fn resize(&mut self, capacity: usize)->Result<()> {
    let capacity = capacity.min((NULL - 2) as usize);
    if self.next > capacity {
      return Err(Error::InvalidArgument("cache holds too much data to shrink".into())) }
    let mut buf = vec![0u8; capacity];
    buf[..self.next].copy_from_slice(&self.buf[..self.next]);
    self.buf = buf;
    Ok(()) }

  pub fn clear(&mut self) {
    self.next = 0;
    self.entries = 0;
    for b in self.buckets.iter_mut() { *b = NULL; }}

  pub fn reset_stats(&mut self) {
    self.hits = 0; self.misses = 0; self.collisions = 0; }

  // -- tuning knobs ------------------------------------------------

  pub fn set_replacement(&mut self, f: f64) { self.replacement = f.clamp(0.0, 1.0); }
  pub fn set_random_replacement(&mut self) { self.random_replacement = true; }
  pub fn set_replace_size(&mut self, min: u64) { self.min_replace_size = min; }

  // -- statistics --------------------------------------------------

  pub fn num_hits(&self)->u64 { self.hits }
  pub fn num_misses(&self)->u64 { self.misses }
  pub fn num_collisions(&self)->u64 { self.collisions }
  pub fn num_entries(&self)->u64 { self.entries }
  pub fn num_buckets(&self)->usize { self.buckets.len() }
  /// bytes in use.
  pub fn size(&self)->usize { self.next }
  pub fn capacity(&self)->usize { self.buf.len() }
  pub fn density(&self)->f64 {
    if self.next == 0 { 0.0 } else {
      self.entries.to_f64().unwrap_or(0.0) / self.next as f64 }}

  pub fn bucket_length(&self, b: usize)->usize {
    let mut len = 0;
    let mut off = self.buckets[b];
    while off != NULL { len += 1; off = self.get32(off as usize + O_NEXT); }
    len }

  pub fn min_bucket_size(&self)->usize {
    (0..self.buckets.len()).map(|b| self.bucket_length(b)).min().unwrap_or(0) }

  pub fn max_bucket_size(&self)->usize {
    (0..self.buckets.len()).map(|b| self.bucket_length(b)).max().unwrap_or(0) }

  /// walk live nodes in arena order.
  pub fn iter(&self)->CacheIter { CacheIter { cache: self, off: 0 }}}

pub struct CacheEntry<'a> {
  pub key: &'a [u8],
  pub hit_count: u32,
  pub size: u32 }

pub struct CacheIter<'a> { cache: &'a Cache, off: usize }

impl<'a> Iterator for CacheIter<'a> {
  type Item = CacheEntry<'a>;
  fn next(&mut self)->Option<CacheEntry<'a>> {
    while self.off != self.cache.next {
      let off = self.off;
      self.off += self.cache.node_size(off);
      if !self.cache.is_free(off) {
        return Some(CacheEntry {
          key: self.cache.key_at(off),
          hit_count: self.cache.get32(off + O_HITS),
          size: self.cache.get32(off + O_SIZE) }) }}
    None }}


// -- tests ----------------------------------------------------------

#[cfg(test)]
fn test_key(n: u64, tag: u64)->Vec<u8> {
  let mut k = vec![];
  k.extend_from_slice(&n.to_le_bytes());
  k.extend_from_slice(&n.to_le_bytes());
  k.extend_from_slice(&tag.to_le_bytes());
  k }

#[cfg(test)]
fn test_poly(i: u32)->FactorPoly { FactorPoly::x(i) + FactorPoly::y(1) }

#[test] fn test_store_lookup() {
  let mut c = Cache::new(64*1024, 16);
  let (ka, kb) = (test_key(9, 1), test_key(9, 2));
  c.store(&ka, &test_poly(2), 7).unwrap();
  assert_eq!(c.num_entries(), 1);
  let (p, id) = c.lookup(&ka).unwrap().expect("stored key should hit");
  assert_eq!(p, test_poly(2));
  assert_eq!(id, 7);
  assert!(c.lookup(&kb).unwrap().is_none());
  assert_eq!(c.num_hits(), 1);
  assert_eq!(c.num_misses(), 1) }

#[test] fn test_all_stored_reachable() {
  let mut c = Cache::new(64*1024, 8);
  for i in 0..40 {
    c.store(&test_key(6, i), &test_poly(i as u32), i as u32).unwrap(); }
  for i in 0..40 {
    let (p, id) = c.lookup(&test_key(6, i)).unwrap().expect("no eviction expected");
    assert_eq!(id, i as u32);
    assert_eq!(p, test_poly(i as u32)); }}

#[test] fn test_eviction_keeps_hot_entries() {
  let mut c = Cache::new(2048, 4);
  let hot = test_key(3, 999);
  c.store(&hot, &test_poly(1), 0).unwrap();
  c.lookup(&hot).unwrap().unwrap();
  c.lookup(&hot).unwrap().unwrap(); // two hits protect it from the first sweeps
  let mut stored = 1;
  for i in 0..200 {
    c.store(&test_key(3, i), &test_poly(2), 1).unwrap();
    stored += 1; }
  assert!(c.num_entries() < stored); // something was displaced
  let (p,_) = c.lookup(&hot).unwrap().expect("hot entry evicted");
  assert_eq!(p, test_poly(1)) }

#[test] fn test_evicted_entries_miss() {
  let mut c = Cache::new(1024, 4);
  c.store(&test_key(3, 0), &test_poly(0), 0).unwrap();
  for i in 1..100 {
    c.store(&test_key(3, i), &test_poly(i as u32), 0).unwrap(); }
  // the first key went in with zero hits and 99 stores of pressure
  assert!(c.lookup(&test_key(3, 0)).unwrap().is_none());
  // whatever the iterator can still see must look up cleanly
  let keys: Vec<Vec<u8>> = c.iter().map(|e| e.key.to_vec()).collect();
  assert_eq!(keys.len() as u64, c.num_entries());
  assert!(!keys.is_empty());
  for k in keys { assert!(c.lookup(&k).unwrap().is_some()); }}

#[test] fn test_protected_sizes_exhaust() {
  let mut c = Cache::new(1024, 4);
  c.set_replace_size(5); // nothing with >= 5 vertices may be evicted
  let mut err = None;
  for i in 0..100 {
    if let Err(e) = c.store(&test_key(9, i), &test_poly(1), 0) { err = Some(e); break }}
  match err {
    Some(Error::OutOfMemory(_)) => {},
    other => panic!("expected out-of-memory, got {:?}", other.map(|e| e.to_string())) }
  // the cache is still usable afterwards
  let keys: Vec<Vec<u8>> = c.iter().map(|e| e.key.to_vec()).collect();
  for k in keys { assert!(c.lookup(&k).unwrap().is_some()); }}

#[test] fn test_rebucket_preserves_entries() {
  let mut c = Cache::new(64*1024, 3);
  for i in 0..20 { c.store(&test_key(4, i), &test_poly(i as u32), 0).unwrap(); }
  c.rebucket(17);
  assert_eq!(c.num_buckets(), 17);
  for i in 0..20 { assert!(c.lookup(&test_key(4, i)).unwrap().is_some()); }}

#[test] fn test_resize() {
  let mut c = Cache::new(4096, 4);
  for i in 0..10 { c.store(&test_key(4, i), &test_poly(i as u32), 0).unwrap(); }
  c.resize(64*1024).unwrap();
  for i in 0..10 { assert!(c.lookup(&test_key(4, i)).unwrap().is_some()); }
  assert!(c.resize(16).is_err()) }

#[test] fn test_clear() {
  let mut c = Cache::new(4096, 4);
  c.store(&test_key(4, 0), &test_poly(0), 0).unwrap();
  c.clear();
  assert_eq!(c.num_entries(), 0);
  assert!(c.lookup(&test_key(4, 0)).unwrap().is_none()) }
