use azul_analysis::azul_move::{EnumeratorConfig, MoveEnumerator};
use azul_analysis::game::{AzulRules, AzulState};
use azul_analysis::session::RandomPositions;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    let positions: Vec<AzulState> = RandomPositions::new(42, 4, 20)
        .take(32)
        .filter_map(|input| input.encoding.parse().ok())
        .collect();
    let rules = AzulRules;

    c.bench_function("enumerate exhaustive", |b| {
        let enumerator = MoveEnumerator::new(&rules, EnumeratorConfig::exhaustive());
        b.iter(|| count_moves(&enumerator, &positions))
    });
    c.bench_function("enumerate filtered and prioritized", |b| {
        let enumerator = MoveEnumerator::new(
            &rules,
            EnumeratorConfig {
                filter_dominated: true,
                prioritize: true,
                max_moves: None,
            },
        );
        b.iter(|| count_moves(&enumerator, &positions))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn count_moves(enumerator: &MoveEnumerator, positions: &[AzulState]) -> usize {
    positions
        .iter()
        .map(|state| enumerator.enumerate(black_box(state)).len())
        .sum()
}
