// mzl CLI entry point.
// Usage: mzl [--verbose] <calc|scopes|defs> ...

fn main() {
    mzl::cli::run();
}
