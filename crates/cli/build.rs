use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("colligo")
        .version("1.0.0")
        .author("Colligo Contributors")
        .about("Bundle web pages into a single PDF, EPUB, or HTML document")
        .subcommand_required(true)
        .subcommand(bundle_command("pdf", "Bundle pages into a PDF"))
        .subcommand(bundle_command("epub", "Bundle pages into an EPUB"))
        .subcommand(bundle_command("html", "Bundle pages into a standalone HTML file"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "colligo", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "colligo", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "colligo", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "colligo", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}

fn bundle_command(name: &'static str, about: &'static str) -> clap::Command {
    clap::Command::new(name)
        .about(about)
        .arg(clap::arg!(<URL>... "URLs or local HTML files to bundle, in reading order"))
        .arg(
            clap::arg!(-o --output <PATH> "Output file, or a directory to receive the derived name")
                .value_name("PATH")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--style <FILE> "Replace the built-in stylesheet with a CSS file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--css <CSS> "Extra CSS appended after the stylesheet").value_name("CSS"))
        .arg(
            clap::arg!(--template <FILE> "Replace the built-in page template with an HTML file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--individual "Produce one artifact per URL instead of a merged bundle"))
        .arg(clap::arg!(--no_sandbox "Launch the browser without its sandbox"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
}
