// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simplehttp::{encode_form, encode_query, Charset, Cookie, CookieJar};

fn query_encoding_benchmark(c: &mut Criterion) {
    let pairs: Vec<(String, String)> = (0..32)
        .map(|i| (format!("key{}", i), format!("value {} & more/中文", i)))
        .collect();

    c.bench_function("encode_query_utf8", |b| {
        b.iter(|| black_box(encode_query(&pairs, None)))
    });

    c.bench_function("encode_query_gb18030", |b| {
        b.iter(|| black_box(encode_query(&pairs, Some(Charset::gb18030()))))
    });
}

fn form_encoding_benchmark(c: &mut Criterion) {
    let mut fields = HashMap::new();
    for i in 0..32 {
        fields.insert(format!("field{}", i), vec!["a b".to_string(), "c=d".to_string()]);
    }

    c.bench_function("encode_form", |b| {
        b.iter(|| black_box(encode_form(&fields, None)))
    });
}

fn cookie_lookup_benchmark(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = url::Url::parse("https://www.example.com/account/settings").unwrap();
    jar.set_cookies(
        &url,
        (0..20).map(|i| Cookie::new(format!("c{}", i), format!("v{}", i)).path("/")),
    );

    c.bench_function("cookie_header", |b| {
        b.iter(|| black_box(jar.cookie_header(&url)))
    });
}

criterion_group!(
    benches,
    query_encoding_benchmark,
    form_encoding_benchmark,
    cookie_lookup_benchmark
);
criterion_main!(benches);
