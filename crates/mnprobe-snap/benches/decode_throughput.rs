use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mnprobe_snap::{decode_str, NumericTable};

fn status_text(n_modes: usize) -> String {
    let mut text = format!("F\n5000 120000 {n_modes} {}\n-42.0 3.1\nF\n", n_modes * 100);
    for mode in 0..n_modes {
        if mode % 3 == 0 {
            text.push_str("1\n2 3\n");
        } else {
            text.push_str("0\n");
        }
    }
    for _ in 0..n_modes {
        text.push_str("F 0 1 100\n0.01 -43.0 2.5\n");
    }
    text
}

fn table_text(rows: usize) -> String {
    (0..rows)
        .map(|row| format!("0.{row} 0.5 1.5 -{row}.25 {}\n", row % 4 + 1))
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let status = status_text(64);
    c.bench_function("decode_status_64_modes", |b| {
        b.iter(|| decode_str(black_box(&status)).expect("decode"))
    });
    let table = table_text(4000);
    c.bench_function("parse_table_4000_rows", |b| {
        b.iter(|| NumericTable::parse(black_box(&table), 0.0).expect("table"))
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
