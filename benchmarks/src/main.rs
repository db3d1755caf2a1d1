// Entry point listing the available benchmarks.

fn main() {
    println!("batch-descent benchmark suite");
    println!();
    println!("Usage:");
    println!("  cargo bench --package benchmarks --bench training");
    println!("  cargo run --package benchmarks --bin echelon_search -- [--csv path] [--out-json path]");
    println!();
    println!("Benchmarks in `training`:");
    println!("  - gradient/<n_features>: one batch gradient on 10k observations");
    println!("  - train/<n_features>: full convergence on synthetic linear data");
    println!("  - train_logistic: sigmoid-linked training on synthetic labels");
}
