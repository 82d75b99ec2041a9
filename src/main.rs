fn main() -> std::process::ExitCode {
    blobshelf_lib::run()
}
