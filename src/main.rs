fn main() {
    deflang::cli::run();
}
