#[macro_use]
extern crate bencher;
use bencher::Bencher;

extern crate tuttex;
use tuttex::cache::Cache;
use tuttex::eval::{Engine, Mode};
use tuttex::graph::Graph;

fn complete(n: u32)->Graph {
  let mut g = Graph::new(n as usize);
  for u in 0..n { for v in (u+1)..n { g.add_edge(u,v); }}
  g }

fn grid(w: u32, h: u32)->Graph {
  let mut g = Graph::new((w*h) as usize);
  for r in 0..h { for c in 0..w {
    let v = r*w + c;
    if c+1 < w { g.add_edge(v, v+1); }
    if r+1 < h { g.add_edge(v, v+w); }}}
  g }

pub fn k4(b:&mut Bencher) {
  b.iter(|| {
    let mut e = Engine::new(Cache::new(1<<20, 1024));
    e.eval(&mut complete(4), Mode::Tutte).unwrap() }); }

pub fn k6(b:&mut Bencher) {
  b.iter(|| {
    let mut e = Engine::new(Cache::new(1<<22, 4096));
    e.eval(&mut complete(6), Mode::Tutte).unwrap() }); }

pub fn grid_3x3(b:&mut Bencher) {
  b.iter(|| {
    let mut e = Engine::new(Cache::new(1<<22, 4096));
    e.eval(&mut grid(3,3), Mode::Tutte).unwrap() }); }

benchmark_group!(evals, k4, k6, grid_3x3);
benchmark_main!(evals);
