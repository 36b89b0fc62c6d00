use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use questbus::config::BusConfig;
use questbus::{Attributes, CommandBus};
use questbus_proto::Parser;

// Parsing in isolation, then publish-to-delivery through the registry actor
// with a handful of always-ready subscribers.

fn parsing_benchmark(c: &mut Criterion) {
    let parser = Parser::default();
    let mut group = c.benchmark_group("parsing");

    for (name, text) in [
        ("answer", "/a forty two"),
        ("plain", "just chatting about the weather"),
    ] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(name, |b| b.iter(|| parser.parse(std::hint::black_box(text))));
    }

    group.finish();
}

fn fanout_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("fanout");

    for subscribers in [1usize, 4, 16] {
        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_function(format!("publish_{subscribers}"), |b| {
            let bus = runtime.block_on(async {
                let bus = CommandBus::new(&BusConfig {
                    delivery_timeout_ms: 1_000,
                    ..BusConfig::default()
                });
                for _ in 0..subscribers {
                    let mut sub = bus.subscribe("a").await;
                    tokio::spawn(async move { while sub.recv().await.is_some() {} });
                }
                bus
            });

            b.to_async(&runtime).iter(|| {
                let bus = bus.clone();
                async move {
                    bus.publish("/a 42", "bench", Attributes::new()).await;
                    // Round-trip through the actor so delivery is included.
                    bus.subscription_count("a").await.unwrap()
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, parsing_benchmark, fanout_benchmark);
criterion_main!(benches);
