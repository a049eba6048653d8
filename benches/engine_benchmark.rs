/*!
 * Engine Benchmarks
 *
 * Full simulation runs over synthetic traces, with and without boosting
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mlfq_sim::{EngineBuilder, ProcessRecord, RecordingSink, Symbol, Trace};

fn synthetic_trace(seed: u32, len: usize) -> Trace {
    let mut symbols: Vec<Symbol> = (0..len)
        .map(|i| {
            if (i as u32).wrapping_mul(31).wrapping_add(seed) % 3 == 0 {
                Symbol::Yield
            } else {
                Symbol::Continue
            }
        })
        .collect();
    symbols.push(Symbol::Terminate);
    Trace::new(symbols)
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for processes in [8u32, 64, 256] {
        for threshold in [None, Some(7)] {
            let id = format!("{}p/boost={:?}", processes, threshold);
            group.bench_with_input(BenchmarkId::from_parameter(id), &processes, |b, &n| {
                b.iter(|| {
                    let mut engine = EngineBuilder::new()
                        .with_levels(8)
                        .with_boost_threshold(threshold)
                        .build(RecordingSink::new())
                        .unwrap();
                    for pid in 0..n {
                        engine
                            .admit(ProcessRecord::new(
                                pid,
                                format!("P{}", pid),
                                8,
                                synthetic_trace(pid, 64),
                            ))
                            .unwrap();
                    }
                    black_box(engine.run().unwrap())
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_full_run);
criterion_main!(benches);
