//! Command-line driver.
//!
//! Reads whitespace-separated graphs from the input file and prints
//! one Maple-style polynomial assignment per graph, plus any requested
//! evaluation points and statistics.  Errors local to one graph do not
//! abort the batch.
use std::fs;
use std::io::Write;
use std::process;
use std::time::Instant;
use clap::Parser;
use log::{debug, error, warn};
use num_bigint::BigInt;
use num_traits::Zero;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use tuttex::cache::Cache;
use tuttex::canon;
use tuttex::eval::{EdgeSel, Engine, Mode, VertOrder, DEFAULT_TIMEOUT};
use tuttex::parse;
use tuttex::tree::TreeWriter;
use tuttex::{Error, FactorPoly, Graph};

include!(concat!(env!("OUT_DIR"), "/tuttex-build-info.rs"));

#[derive(Parser, Debug)]
#[command(name = "tuttex", version = TUTTEX_VERSION,
          about = "compute Tutte, chromatic, and flow polynomials of multigraphs")]
struct Args {
  /// input graph file
  input: String,

  /// output summary information regarding the computation
  #[arg(short = 'i', long)]
  info: bool,

  /// output the info summary as a single line (useful for generating data)
  #[arg(short = 'q', long)]
  quiet: bool,

  /// timeout after this many seconds
  #[arg(short = 't', long, value_name = "SECS")]
  timeout: Option<i64>,

  /// evaluate the computed polynomial at x,y (repeatable)
  #[arg(short = 'T', long = "eval", value_name = "X,Y")]
  eval: Vec<String>,

  /// number of graphs to process from the input file
  #[arg(short = 'n', long, value_name = "N")]
  ngraphs: Option<u64>,

  /// threshold below which graphs skip the cache (default 5)
  #[arg(long, value_name = "N")]
  small_graphs: Option<String>,

  /// cache size to allocate, e.g. 700M
  #[arg(short = 'c', long, value_name = "SIZE")]
  cache_size: Option<String>,

  /// number of buckets to use in the cache, e.g. 10000
  #[arg(long, value_name = "N")]
  cache_buckets: Option<String>,

  /// ratio (between 0 and 1) of the cache to displace when full
  #[arg(long, value_name = "F")]
  cache_replacement: Option<f64>,

  /// use the random replacement policy
  #[arg(long)]
  cache_random: bool,

  /// print a cache stats summary, or write detailed stats to a file
  #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "")]
  cache_stats: Option<String>,

  /// disable caching
  #[arg(long)]
  no_caching: bool,

  /// keep the cache across graphs in a batch
  #[arg(long)]
  no_reset: bool,

  /// generate the chromatic polynomial
  #[arg(long)]
  chromatic: bool,

  /// generate the flow polynomial
  #[arg(long)]
  flow: bool,

  /// minimise endpoint (underlying) degree sum
  #[arg(long)]
  minimise_degree: bool,

  /// minimise the single smallest endpoint (underlying) degree
  #[arg(long)]
  minimise_sdegree: bool,

  /// minimise endpoint degree product
  #[arg(long)]
  minimise_mdegree: bool,

  /// maximise endpoint (underlying) degree sum
  #[arg(long)]
  maximise_degree: bool,

  /// maximise endpoint degree product
  #[arg(long)]
  maximise_mdegree: bool,

  /// select the first available edge, starting from vertex 0
  #[arg(long)]
  vertex_order: bool,

  /// random edge selection
  #[arg(long)]
  random: bool,

  /// use a random ordering of vertices
  #[arg(long)]
  random_ordering: bool,

  /// sort vertices by degree, smallest first
  #[arg(long)]
  mindeg_ordering: bool,

  /// sort vertices by degree, largest first
  #[arg(long)]
  maxdeg_ordering: bool,

  /// sort vertices by underlying degree, smallest first
  #[arg(long)]
  minudeg_ordering: bool,

  /// sort vertices by underlying degree, largest first
  #[arg(long)]
  maxudeg_ordering: bool,

  /// output the computation tree
  #[arg(long)]
  tree: bool,

  /// output the computation tree with graph bodies
  #[arg(long)]
  full_tree: bool,

  /// output the computation tree as XML
  #[arg(long)]
  xml_tree: bool }

fn main() {
  let args = match Args::try_parse() {
    Ok(a) => a,
    Err(e) => {
      use clap::error::ErrorKind::*;
      let code = match e.kind() { DisplayHelp | DisplayVersion => 0, _ => 1 };
      let _ = e.print();
      process::exit(code); }};
  let level = if args.quiet { LevelFilter::Warn } else { LevelFilter::Info };
  TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).ok();
  debug!("tuttex {} (opt-level {})", TUTTEX_VERSION, TUTTEX_OPT_LEVEL);
  process::exit(run(args));
}

fn amount_or_exit(s: Option<&str>, default: u64)->std::result::Result<u64, i32> {
  match s {
    None => Ok(default),
    Some(s) => parse_amount_arg(s) }}

fn parse_amount_arg(s:&str)->std::result::Result<u64, i32> {
  parse::parse_amount(s).map_err(|e| { error!("{}", e); 1 })}

fn run(args: Args)->i32 {
  let mode =
    if args.chromatic && args.flow { error!("choose one of --chromatic and --flow"); return 1 }
    else if args.chromatic { Mode::Chromatic }
    else if args.flow { Mode::Flow }
    else { Mode::Tutte };

  let heuristic =
    if args.minimise_degree { EdgeSel::MinDeg }
    else if args.minimise_sdegree { EdgeSel::MinSDeg }
    else if args.minimise_mdegree { EdgeSel::MinMDeg }
    else if args.maximise_degree { EdgeSel::MaxDeg }
    else if args.maximise_mdegree { EdgeSel::MaxMDeg }
    else if args.random { EdgeSel::Random }
    else { EdgeSel::VertexOrder }; // --vertex-order names the default

  let ordering =
    if args.random_ordering { VertOrder::Random }
    else if args.mindeg_ordering { VertOrder::MinDeg }
    else if args.maxdeg_ordering { VertOrder::MaxDeg }
    else if args.minudeg_ordering { VertOrder::MinUDeg }
    else { VertOrder::MaxUDeg };

  let cache_size = match amount_or_exit(args.cache_size.as_deref(), 256 << 20) {
    Ok(v) => v as usize, Err(c) => return c };
  let cache_buckets = match amount_or_exit(args.cache_buckets.as_deref(), 1_000_000) {
    Ok(v) => v as usize, Err(c) => return c };
  let small_graphs = match amount_or_exit(args.small_graphs.as_deref(), 5) {
    Ok(v) => v as u32, Err(c) => return c };

  let mut evalpoints: Vec<(i64,i64)> = vec![];
  for s in &args.eval {
    match parse::parse_evalpoint(s) {
      Ok(p) => evalpoints.push(p),
      Err(e) => { error!("{}", e); return 1 }}}

  if let Some(f) = args.cache_replacement {
    if !(0.0..=1.0).contains(&f) { error!("--cache-replacement wants a fraction"); return 1 }}

  let mut cache = Cache::new(cache_size, cache_buckets);
  if let Some(f) = args.cache_replacement { cache.set_replacement(f); }
  if args.cache_random { cache.set_random_replacement(); }

  let mut engine = Engine::new(cache);
  engine.heuristic = heuristic;
  engine.small_graph = if args.no_caching { 10_000 } else { small_graphs };
  if args.tree || args.full_tree || args.xml_tree {
    engine.tree = Some(TreeWriter { xml: args.xml_tree, full: args.full_tree }); }

  let timeout = args.timeout.unwrap_or(DEFAULT_TIMEOUT);
  engine.spawn_status_timer();

  let text = match fs::read_to_string(&args.input) {
    Ok(t) => t,
    Err(e) => { error!("{}: {}", args.input, e); return 2 }};

  let ngraphs = args.ngraphs.unwrap_or(u64::MAX);
  let mut done = 0u64;
  for token in text.split_whitespace() {
    if done >= ngraphs { break }
    let g0 = match parse::read_graph(token) {
      Ok(g) => g,
      Err(e) => { error!("{}", e); continue }};
    match run_one(&args, &mut engine, mode, ordering, timeout, &evalpoints, done, &g0) {
      Ok(()) => {},
      Err(code) => return code }
    done += 1; }

  if let Some(spec) = &args.cache_stats {
    if spec.is_empty() { print_cache_summary(&engine, cache_size); }
    else if let Err(e) = write_cache_details(spec, &engine) {
      error!("{}: {}", spec, e); return 2 }}
  0 }

#[allow(clippy::too_many_arguments)]
fn run_one(args:&Args, engine:&mut Engine, mode: Mode, ordering: VertOrder,
           timeout: i64, evalpoints:&[(i64,i64)], idx: u64, g0:&Graph)
           ->std::result::Result<(), i32> {
  let mut g = engine.permute(&g0.compact(), ordering);
  if !args.no_reset { engine.cache.clear(); }
  engine.cache.reset_stats();
  engine.stats.reset();
  engine.set_timeout(timeout);

  let nv = g.num_vertices() as u64;
  let ne = g.num_edges();
  let nc = g.num_components() as u64;

  // a self-loop zeroes every chromatic polynomial
  if mode == Mode::Chromatic && g.bundles().any(|(u,v,_)| u == v) {
    println!("CP[{}] := 0 :", idx+1);
    return Ok(()) }

  if let Some(t) = &engine.tree { t.start(idx as u32); }
  let timer = Instant::now();
  let result = engine.eval(&mut g, mode);
  let elapsed = timer.elapsed().as_secs_f64();
  if let Some(t) = &engine.tree { t.end(idx as u32); }

  let poly = match result {
    Ok(p) => p,
    Err(Error::OutOfMemory(bytes)) => {
      error!("cache exhausted ({} bytes requested); graph {} abandoned", bytes, idx+1);
      return Ok(()) }
    Err(e) => { error!("{}", e); return Err(2) }};
  if engine.timed_out() {
    warn!("timeout exceeded on graph {}; the reported polynomial is invalid", idx+1); }

  if args.quiet {
    for &(x,y) in evalpoints { print!("{}\t", poly.substitute(x,y)); }
    println!();
    if args.info {
      print!("{}\t{}\t{:.3}\t{}\t{}\t{}\t{}\t{}",
             nv, ne, elapsed, engine.stats.steps, engine.stats.bicomps,
             engine.stats.disbicomps, engine.stats.cycles, engine.stats.trees);
      if mode == Mode::Tutte {
        print!("\t{}\t{}", poly.substitute(1,1), poly.substitute(2,2)); }
      println!(); }}
  else {
    print_poly_line(mode, idx, &poly, nv, ne, nc);
    for &(x,y) in evalpoints {
      println!("TP[{}]({},{}) = {}", idx+1, x, y, poly.substitute(x,y)); }
    if args.info { print_info_block(mode, &poly, nv, ne, elapsed, engine); }}
  Ok(()) }

fn print_poly_line(mode: Mode, idx: u64, poly:&FactorPoly, nv: u64, ne: u64, nc: u64) {
  match mode {
    Mode::Tutte => println!("TP[{}] := {} :", idx+1, poly),
    Mode::Flow => {
      let sign = if (ne as i64 - nv as i64 + nc as i64) % 2 != 0 { -1 } else { 1 };
      println!("FP[{}] := {} * ( {} ) :",
               idx+1, sign, poly.to_string().replace('y', "(1-x)")); }
    Mode::Chromatic => {
      let sign = if (nv as i64 - nc as i64) % 2 != 0 { -1 } else { 1 };
      println!("CP[{}] := {} * x * ( {} ) :",
               idx+1, sign, poly.to_string().replace('x', "(1-x)")); }}}

fn print_info_block(mode: Mode, poly:&FactorPoly, nv: u64, ne: u64,
                    elapsed: f64, engine:&Engine) {
  println!("=======");
  println!("V = {}, E = {}", nv, ne);
  println!("Size of Computation Tree: {} graphs.", engine.stats.steps);
  println!("Number of Biconnected Components Extracted: {}.", engine.stats.bicomps);
  println!("Number of Biconnected Components Separated: {}.", engine.stats.disbicomps);
  println!("Number of Cycles Terminated: {}.", engine.stats.cycles);
  println!("Number of Trees Terminated: {}.", engine.stats.trees);
  println!("Time : {:.3}s", elapsed);
  if mode == Mode::Tutte {
    println!("T(1,1) = {}", poly.substitute(1,1));
    println!("T(2,2) = {} (should be {})", poly.substitute(2,2),
             BigInt::from(1) << (ne as usize));
    // T(-1,-1) is a signed power of two; anything else flags a bug
    let mut t = poly.substitute(-1,-1);
    let mut pow = 0u64;
    while !t.is_zero() && (&t % 2u8).is_zero() { t /= 2u8; pow += 1; }
    if t == BigInt::from(-1) { println!("T(-1,-1) = -2^{}", pow); }
    else if t == BigInt::from(1) { println!("T(-1,-1) = 2^{}", pow); }
    else { println!("T(-1,-1) = 2^{} * {}", pow, t); }}}

fn print_cache_summary(engine:&Engine, cache_size: usize) {
  println!();
  println!("###############");
  println!("# CACHE STATS #");
  println!("###############");
  println!("Size: {}MB", cache_size / (1024*1024));
  println!("Density: {:.3} graphs/MB", engine.cache.density() * 1024.0 * 1024.0);
  println!("# Entries: {}", engine.cache.num_entries());
  println!("# Cache Hits: {}", engine.cache.num_hits());
  println!("# Cache Misses: {}", engine.cache.num_misses());
  println!("# Cache Collisions: {}", engine.cache.num_collisions());
  println!("Min Bucket Length: {}", engine.cache.min_bucket_size());
  println!("Max Bucket Length: {}", engine.cache.max_bucket_size());
  print_hit_counts(&mut std::io::stdout(), engine).ok(); }

fn write_cache_details(path:&str, engine:&Engine)->std::io::Result<()> {
  let mut out = fs::File::create(path)?;
  write_bucket_lengths(&mut out, engine)?;
  write_graph_sizes(&mut out, engine)?;
  print_hit_counts(&mut out, engine) }

fn write_bucket_lengths(out:&mut dyn Write, engine:&Engine)->std::io::Result<()> {
  writeln!(out, "############################")?;
  writeln!(out, "# CACHE BUCKET LENGTH DATA #")?;
  writeln!(out, "############################")?;
  writeln!(out, "# Length\tCount")?;
  let mut counts: Vec<u64> = vec![];
  for b in 0..engine.cache.num_buckets() {
    let len = engine.cache.bucket_length(b);
    if counts.len() <= len { counts.resize(len+1, 0); }
    counts[len] += 1; }
  for (len, n) in counts.iter().enumerate() {
    let pct = (*n as f64 * 100.0) / engine.cache.num_buckets() as f64;
    writeln!(out, "{}\t{}\t{:.2}", len, n, pct)?; }
  Ok(()) }

fn write_graph_sizes(out:&mut dyn Write, engine:&Engine)->std::io::Result<()> {
  writeln!(out)?;
  writeln!(out, "#########################")?;
  writeln!(out, "# CACHE GRAPH SIZE DATA #")?;
  writeln!(out, "#########################")?;
  writeln!(out, "# V\t#Graphs (%)\t#MultiGraphs (%)")?;
  let mut counts: Vec<u64> = vec![];
  let mut mcounts: Vec<u64> = vec![];
  let (mut ngraphs, mut nmgraphs) = (0u64, 0u64);
  for entry in engine.cache.iter() {
    let n = canon::real_vertices(entry.key) as usize;
    if counts.len() <= n { counts.resize(n+1, 0); mcounts.resize(n+1, 0); }
    ngraphs += 1;
    counts[n] += 1;
    if canon::expanded_vertices(entry.key) > n as u64 {
      nmgraphs += 1;
      mcounts[n] += 1; }}
  for i in 0..counts.len() {
    let pct = (counts[i] as f64 * 100.0) / (ngraphs.max(1) as f64);
    let mpct = (mcounts[i] as f64 * 100.0) / (nmgraphs.max(1) as f64);
    writeln!(out, "{}\t{}\t{:.2}\t{}\t{:.2}", i, counts[i], pct, mcounts[i], mpct)?; }
  Ok(()) }

fn print_hit_counts(out:&mut dyn Write, engine:&Engine)->std::io::Result<()> {
  writeln!(out)?;
  writeln!(out, "##############################")?;
  writeln!(out, "# CACHE GRAPH HIT COUNT DATA #")?;
  writeln!(out, "##############################")?;
  writeln!(out, "# V\tHit Count")?;
  for (v, n) in engine.stats.hit_sizes.iter().enumerate() {
    writeln!(out, "{}\t{}", v, n)?; }
  Ok(()) }
