//! Two-variable polynomials over arbitrary-precision integers.
//!
//! `Terms` is a plain sparse polynomial (monomial -> coefficient).
//! `FactorPoly` keeps a sum of `muls * base` summands, where `base` is
//! a small `Terms` value and `muls` collects the monomials it has been
//! multiplied by.  The recursion mostly multiplies whole results by
//! monomials and adds, and many intermediate results share a base, so
//! addition merges summands with equal bases instead of expanding.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// A monomial x^xp * y^yp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mono { pub xp: u32, pub yp: u32 }

impl Mono {
  #[inline] pub fn one()->Mono { Mono { xp:0, yp:0 }}
  #[inline] pub fn x(k:u32)->Mono { Mono { xp:k, yp:0 }}
  #[inline] pub fn y(k:u32)->Mono { Mono { xp:0, yp:k }}
  #[inline] pub fn times(self, o:Mono)->Mono { Mono { xp: self.xp+o.xp, yp: self.yp+o.yp }}
  #[inline] pub fn is_one(self)->bool { self.xp == 0 && self.yp == 0 }}

fn powi(base:&BigInt, e:u32)->BigInt {
  let mut r = BigInt::one();
  for _ in 0..e { r = r * base; }
  r }

/// sparse polynomial as an ordered term map; coefficients are never
/// stored as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terms { ts: BTreeMap<Mono, BigUint> }

impl Terms {
  pub fn zero()->Terms { Terms { ts: BTreeMap::new() }}
  pub fn one()->Terms { Terms::mono(Mono::one()) }
  pub fn mono(m:Mono)->Terms {
    let mut ts = BTreeMap::new();
    ts.insert(m, BigUint::one());
    Terms { ts }}

  /// x^k
  pub fn x(k:u32)->Terms { Terms::mono(Mono::x(k)) }
  /// y^k
  pub fn y(k:u32)->Terms { Terms::mono(Mono::y(k)) }

  /// y^a + y^(a+1) + ... + y^(a+b): the run of y powers the recursion
  /// uses when it collapses a parallel bundle.
  pub fn y_run(a:u32, b:u32)->Terms {
    let mut r = Terms::zero();
    for i in 0..=b { r.add_term(Mono::y(a+i), BigUint::one()); }
    r }

  #[inline] pub fn is_zero(&self)->bool { self.ts.is_empty() }
  pub fn is_one(&self)->bool {
    self.ts.len() == 1 &&
      self.ts.get(&Mono::one()).map(|c| c.is_one()).unwrap_or(false) }
  #[inline] pub fn num_terms(&self)->usize { self.ts.len() }

  pub fn add_term(&mut self, m:Mono, c:BigUint) {
    if c.is_zero() { return }
    *self.ts.entry(m).or_insert_with(BigUint::zero) += c; }

  pub fn add(&mut self, o:&Terms) {
    for (m,c) in &o.ts { self.add_term(*m, c.clone()); }}

  /// multiply by a single monomial.
  pub fn shifted(&self, m:Mono)->Terms {
    if m.is_one() { return self.clone() }
    let mut r = BTreeMap::new();
    for (t,c) in &self.ts { r.insert(t.times(m), c.clone()); }
    Terms { ts: r }}

  pub fn mul(&self, o:&Terms)->Terms {
    let mut r = Terms::zero();
    for (m,c) in &self.ts {
      for (n,d) in &o.ts {
        r.add_term(m.times(*n), c * d); }}
    r }

  /// evaluate at integer (x, y).
  pub fn substitute(&self, x:i64, y:i64)->BigInt {
    let (bx, by) = (BigInt::from(x), BigInt::from(y));
    let mut total = BigInt::zero();
    for (m,c) in &self.ts {
      total += BigInt::from(c.clone()) * powi(&bx, m.xp) * powi(&by, m.yp); }
    total }}

impl fmt::Display for Terms {
  fn fmt(&self, f:&mut fmt::Formatter)->fmt::Result {
    if self.ts.is_empty() { return write!(f, "0") }
    let mut first = true;
    for (m,c) in self.ts.iter().rev() {
      if !first { write!(f, " + ")?; }
      first = false;
      let mut star = false;
      if !c.is_one() || m.is_one() { write!(f, "{}", c)?; star = true; }
      for (p,name) in [(m.xp,"x"), (m.yp,"y")] {
        if p == 0 { continue }
        if star { write!(f, "*")?; }
        star = true;
        if p == 1 { write!(f, "{}", name)?; } else { write!(f, "{}^{}", name, p)?; }}}
    Ok(()) }}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Summand { muls: Terms, base: Terms }

/// A polynomial as an unordered sum of `muls * base` summands.  No two
/// summands share an equal base: adding a factor whose base already
/// appears folds its monomials into the existing summand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorPoly { ss: Vec<Summand> }

impl FactorPoly {
  pub fn zero()->FactorPoly { FactorPoly { ss: vec![] }}
  pub fn one()->FactorPoly { FactorPoly::from_terms(Terms::one()) }
  pub fn x(k:u32)->FactorPoly { FactorPoly::from_terms(Terms::x(k)) }
  pub fn y(k:u32)->FactorPoly { FactorPoly::from_terms(Terms::y(k)) }

  pub fn from_terms(t:Terms)->FactorPoly {
    if t.is_zero() { return FactorPoly::zero() }
    FactorPoly { ss: vec![Summand { muls: Terms::one(), base: t }] }}

  #[inline] pub fn is_zero(&self)->bool { self.ss.is_empty() }
  #[inline] pub fn num_summands(&self)->usize { self.ss.len() }

  fn push(&mut self, muls:Terms, base:Terms) {
    if muls.is_zero() || base.is_zero() { return }
    for s in self.ss.iter_mut() {
      if s.base == base { s.muls.add(&muls); return }}
    self.ss.push(Summand { muls, base }); }

  /// multiply by a single monomial; only the monomial bags move.
  pub fn scaled(&self, m:Mono)->FactorPoly {
    let ss = self.ss.iter()
      .map(|s| Summand { muls: s.muls.shifted(m), base: s.base.clone() })
      .collect();
    FactorPoly { ss }}

  /// multiply every summand's base by a small polynomial, re-merging
  /// summands whose bases collide afterwards.
  pub fn base_mul(&self, t:&Terms)->FactorPoly {
    if t.is_zero() { return FactorPoly::zero() }
    let mut r = FactorPoly::zero();
    for s in &self.ss { r.push(s.muls.clone(), s.base.mul(t)); }
    r }

  /// flatten to a plain term map.
  pub fn expand(&self)->Terms {
    let mut r = Terms::zero();
    for s in &self.ss {
      let prod = s.muls.mul(&s.base);
      r.add(&prod); }
    r }

  pub fn substitute(&self, x:i64, y:i64)->BigInt {
    let mut total = BigInt::zero();
    for s in &self.ss {
      total += s.muls.substitute(x,y) * s.base.substitute(x,y); }
    total }}

impl Add for FactorPoly {
  type Output = FactorPoly;
  fn add(mut self, o:FactorPoly)->FactorPoly {
    for s in o.ss { self.push(s.muls, s.base); }
    self }}

/// full convolution; only biconnected composition needs it.
impl Mul for FactorPoly {
  type Output = FactorPoly;
  fn mul(self, o:FactorPoly)->FactorPoly {
    if self.is_zero() || o.is_zero() { return FactorPoly::zero() }
    FactorPoly::from_terms(self.expand().mul(&o.expand())) }}

impl fmt::Display for FactorPoly {
  /// the expanded Maple-parseable form.
  fn fmt(&self, f:&mut fmt::Formatter)->fmt::Result { write!(f, "{}", self.expand()) }}


// -- tests ----------------------------------------------------------

#[test] fn test_y_run() {
  let p = Terms::y_run(0,2); // 1 + y + y^2
  assert_eq!(p.num_terms(), 3);
  assert_eq!(p.substitute(0,2), BigInt::from(7));
  assert_eq!(Terms::y_run(1,0), Terms::y(1)) }

#[test] fn test_add_merges_bases() {
  let base = Terms::y_run(0,1);
  let a = FactorPoly::from_terms(base.clone()).scaled(Mono::x(2));
  let b = FactorPoly::from_terms(base).scaled(Mono::y(1));
  let sum = a + b;
  assert_eq!(sum.num_summands(), 1); // (x^2 + y) * (1+y)
  assert_eq!(sum.substitute(1,1), BigInt::from(4)) }

#[test] fn test_scaled_distributes() {
  let p = FactorPoly::x(1) + FactorPoly::y(1); // x + y
  let q = p.scaled(Mono::x(1));                // x^2 + x*y
  assert_eq!(q.substitute(2,3), BigInt::from(10)) }

#[test] fn test_mul() {
  let p = FactorPoly::x(1) + FactorPoly::one();  // x + 1
  let q = p.clone() * p;                         // x^2 + 2x + 1
  assert_eq!(q.substitute(1,0), BigInt::from(4));
  assert_eq!(q.substitute(-3,0), BigInt::from(4)) }

#[test] fn test_substitute_negative() {
  // x^2 + x + y at (-1,-1)
  let p = FactorPoly::x(2) + FactorPoly::x(1) + FactorPoly::y(1);
  assert_eq!(p.substitute(-1,-1), BigInt::from(-1)) }

#[test] fn test_display() {
  let p = FactorPoly::x(2) + FactorPoly::x(1) + FactorPoly::y(1);
  assert_eq!(p.to_string(), "x^2 + x + y");
  assert_eq!(FactorPoly::zero().to_string(), "0");
  assert_eq!(FactorPoly::one().to_string(), "1");
  let two = FactorPoly::one() + FactorPoly::one();
  assert_eq!(two.to_string(), "2");
  let q = FactorPoly::from_terms(Terms::x(1).mul(&Terms::y(2)));
  assert_eq!(q.to_string(), "x*y^2") }

#[test] fn test_serialize_roundtrip() {
  let p = (FactorPoly::x(3) + FactorPoly::y(2)).base_mul(&Terms::y_run(0,2));
  let bytes = bincode::serialize(&p).unwrap();
  let q: FactorPoly = bincode::deserialize(&bytes).unwrap();
  assert_eq!(p, q);
  assert_eq!(bincode::serialize(&q).unwrap(), bytes) }

#[test] fn test_expand_matches_substitute() {
  let p = (FactorPoly::x(1) + FactorPoly::y(1)).base_mul(&Terms::y_run(0,3));
  assert_eq!(p.expand().substitute(2,5), p.substitute(2,5)) }
