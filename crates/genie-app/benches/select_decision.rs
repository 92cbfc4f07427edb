use criterion::{Criterion, black_box, criterion_group, criterion_main};
use genie_bot::selector::{BalancedSelector, QuestionSelector};
use genie_bot::session::GameSession;
use genie_core::belief::BeliefState;
use genie_core::model::answer::Answer;
use genie_core::model::roster::Roster;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

fn play_truthful(roster: &Arc<Roster>, secret: usize, seed: u64) {
    let mut session = GameSession::with_seed(roster.clone(), seed);
    let secret = roster.candidate(secret);
    while let Some(question) = session.current_question() {
        let answer = if secret.matches(question) {
            Answer::Yes
        } else {
            Answer::No
        };
        let _ = session.answer(answer);
    }
    black_box(session.phase());
}

fn select_decision_bench(c: &mut Criterion) {
    let roster = Arc::new(Roster::builtin());
    let selector = BalancedSelector::default();
    let belief = BeliefState::new(&roster);

    let mut group = c.benchmark_group("select_decision");
    group.bench_function("first_question", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| black_box(selector.select(&roster, &belief, &mut rng)))
    });
    for secret in [0usize, 5, 10] {
        group.bench_function(format!("truthful_game_{secret}"), |b| {
            b.iter(|| play_truthful(&roster, secret, 42))
        });
    }
    group.finish();
}

criterion_group!(benches, select_decision_bench);
criterion_main!(benches);
