fn main() {
    std::process::exit(control_tool::run_from_env());
}
