use chacha20::ChaCha8Rng;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand_core::SeedableRng;
use sike::{decapsulate, encapsulate, keygen, Variant};

pub fn sike_p434(c: &mut Criterion) {
    let params = Variant::SikeP434.params();
    let mut group = c.benchmark_group("SIKEp434");

    group.bench_function("keygen", |b| {
        b.iter_batched(
            || ChaCha8Rng::seed_from_u64(0),
            |mut rng| keygen(&mut rng, params),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("encapsulate", |b| {
        b.iter_batched(
            || {
                let mut rng = ChaCha8Rng::seed_from_u64(1);
                let sk = keygen(&mut rng, params);
                (rng, sk.public_key())
            },
            |(mut rng, pk)| encapsulate(&mut rng, &pk, params),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("decapsulate", |b| {
        b.iter_batched(
            || {
                let mut rng = ChaCha8Rng::seed_from_u64(2);
                let sk = keygen(&mut rng, params);
                let (ct, _key) = encapsulate(&mut rng, &sk.public_key(), params);
                (sk, ct)
            },
            |(sk, ct)| decapsulate(&sk, &ct, params),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, sike_p434);
criterion_main!(benches);
