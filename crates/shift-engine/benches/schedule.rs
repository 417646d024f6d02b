use chrono::{NaiveDate, Weekday};
use criterion::{criterion_group, criterion_main, Criterion};
use shift_engine::{generate, Recurrence, Rule, ScheduleQuery, Unavailability, Validity};
use std::hint::black_box;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        rules.push(Rule::weekly(weekday, 20, "08:00", "12:00").unwrap());
        rules.push(
            Rule::weekly(weekday, 30, "14:00", "18:00")
                .unwrap()
                .with_recurrence(Recurrence::EveryTwoWeeks)
                .with_validity(Validity {
                    from: Some(date(2016, 1, 1)),
                    to: None,
                }),
        );
    }
    rules
}

fn bench_generate(c: &mut Criterion) {
    let rules = rules();
    let off: Vec<Unavailability> = (1..=12)
        .map(|m| Unavailability::whole_days(date(2016, m, 1), date(2016, m, 3)).unwrap())
        .collect();

    let month = ScheduleQuery::new(date(2016, 1, 1), date(2016, 1, 31));
    let year = ScheduleQuery::new(date(2016, 1, 1), date(2016, 12, 31));

    c.bench_function("generate/one_month", |b| {
        b.iter(|| generate(black_box(&rules), &[], black_box(&month)).unwrap())
    });
    c.bench_function("generate/one_year", |b| {
        b.iter(|| generate(black_box(&rules), &[], black_box(&year)).unwrap())
    });
    c.bench_function("generate/one_year_with_exclusions", |b| {
        b.iter(|| generate(black_box(&rules), black_box(&off), black_box(&year)).unwrap())
    });
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
