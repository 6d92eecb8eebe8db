use criterion::{criterion_group, criterion_main, Criterion};
use search_core::Tokenizer;

const TEXT: &str = "Python is a high-level, general-purpose programming language. Its design \
philosophy emphasizes code readability with the use of significant indentation. Python is \
dynamically typed and garbage-collected. It supports multiple programming paradigms, including \
structured, object-oriented and functional programming. It is often described as a \
\"batteries included\" language due to its comprehensive standard library. #python @guido";

fn bench_tokenize(c: &mut Criterion) {
    let tok = Tokenizer::english();
    let text = TEXT.repeat(20);
    c.bench_function("tokenize_paragraphs", |b| b.iter(|| tok.tokenize(&text)));
    c.bench_function("tokenize_query", |b| b.iter(|| tok.tokenize("python programming language")));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
