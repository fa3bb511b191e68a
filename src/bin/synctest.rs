fn main() {
    synctest::cli::run();
}
