//! Benchmark for tuple extraction and evaluate()

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tdl2048::board::Board;
use tdl2048::environment::RandomEnvironment;
use tdl2048::evaluator::Evaluator;
use tdl2048::learning::{DEFAULT_INITIAL_TILES, TDLearner, play_episode};
use tdl2048::player::TdPlayer;

/// Opening boards from seeded environments.
fn sample_boards() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(99);
    let mut boards = Vec::new();
    for _ in 0..64 {
        let mut board = Board::new();
        let mut env = RandomEnvironment::new(Some(rng.random()));
        for _ in 0..DEFAULT_INITIAL_TILES {
            env.take_action(&board, None).apply(&mut board);
        }
        boards.push(board);
    }
    boards
}

fn bench_extract_indices(c: &mut Criterion) {
    let evaluator = Evaluator::new();
    let boards = sample_boards();

    c.bench_function("extract_indices", |b| {
        b.iter(|| {
            for board in &boards {
                black_box(evaluator.indices(black_box(board)));
            }
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    // trained weights so the lookups are not all into zeroed pages
    let mut player = TdPlayer::new(Evaluator::new(), TDLearner::default());
    let mut env = RandomEnvironment::new(Some(1));
    for _ in 0..50 {
        play_episode(&mut player, &mut env, DEFAULT_INITIAL_TILES);
    }
    let evaluator = player.evaluator();
    let boards = sample_boards();

    c.bench_function("evaluate", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for board in &boards {
                sum += evaluator.evaluate(black_box(board));
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_extract_indices, bench_evaluate);
criterion_main!(benches);
