use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "website_deploy_lambda";
const LAMBDA_BINARY: &str = "website_helper";
const MANIFEST_ENTRY: &str = "webapp-manifest.json";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the website deployment workspace",
    long_about = "A unified CLI for CI checks and Lambda packaging in the\n\
                  website deployment custom-resource workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the website helper Lambda zip
    Package {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Asset manifest shipped next to the bootstrap binary
        #[arg(
            long,
            env = "WEBAPP_MANIFEST",
            default_value = "crates/website_deploy_lambda/assets/webapp-manifest.json"
        )]
        manifest: String,
        /// Output directory for the zip artifact
        #[arg(long, default_value = "dist")]
        dist_dir: String,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Run lint + test
    Check,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_website_helper(target: &str, manifest: &Path, dist_dir: &Path) {
    ensure_rust_target_installed(target);

    let manifest_body = fs::read(manifest)
        .unwrap_or_else(|error| panic!("failed to read manifest '{}': {error}", manifest.display()));
    if let Err(error) = serde_json::from_slice::<Vec<String>>(&manifest_body) {
        panic!(
            "manifest '{}' must be a JSON array of relative keys: {error}",
            manifest.display()
        );
    }

    step("Build website helper lambda binary");

    run_cargo(&[
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--release",
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ]);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join("release");
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join("website-helper.zip");
    package_lambda_zip(
        &target_dir.join(LAMBDA_BINARY),
        &manifest_body,
        &zip_path,
    );

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- package`"
        );
    }
}

fn package_lambda_zip(binary_path: &Path, manifest_body: &[u8], zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let executable = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", executable)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");

    let data = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    zip.start_file(MANIFEST_ENTRY, data)
        .expect("failed to start manifest entry in lambda zip");
    zip.write_all(manifest_body)
        .expect("failed to write manifest entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test website_deploy_core");
    run_cargo(&["test", "-p", "website_deploy_core"]);

    step("Test website_deploy_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Package {
            target,
            manifest,
            dist_dir,
        } => {
            package_website_helper(&target, Path::new(&manifest), Path::new(&dist_dir));
        }
    }
}
