#[derive(thiserror::Error, Debug)]
#[error("no global tracing subscriber set")]
struct NoTracingSubscriber;

fn configure_tracing() -> anyhow::Result<()> {
	let result = Err(NoTracingSubscriber);

	#[cfg(all(target_arch = "wasm32", feature = "csr"))]
	let result = result.or_else(|_| tracing_wasm::try_set_as_global_default());

	let result = result.or_else(|_| {
		let max_level = if cfg!(debug_assertions) {
			tracing::Level::TRACE
		} else {
			tracing::Level::INFO
		};
		tracing::subscriber::set_global_default(
			tracing_subscriber::FmtSubscriber::builder()
				.with_max_level(max_level)
				.with_writer(std::io::stderr)
				.finish(),
		)
	});

	Ok(result?)
}

fn configure_logging() -> anyhow::Result<()> {
	configure_tracing()?;

	// Redirect `log` to `tracing`. If setting the global subscriber failed above, the "log" feature on `tracing` sends everything the other way instead.
	#[cfg(feature = "log")]
	tracing_log::LogTracer::init()?;

	Ok(())
}

#[cfg(feature = "csr")]
fn main() {
	#[cfg(target_arch = "wasm32")]
	console_error_panic_hook::set_once();

	if let Err(error) = configure_logging() {
		// We can technically continue without logging.
		tracing::error!(error = error.to_string());
	}

	leptos::mount::mount_to_body(inkpatch::App)
}

/// Replays a recorded canvas and writes it out as a PNG.
#[cfg(not(feature = "csr"))]
#[derive(clap::Parser, Debug)]
#[command(name = "inkpatch", version, about)]
struct Args {
	/// Recording to replay, as written by `Recording::to_json`.
	input: std::path::PathBuf,

	/// Where to write the PNG.
	output: std::path::PathBuf,
}

#[cfg(not(feature = "csr"))]
fn main() -> anyhow::Result<()> {
	use anyhow::Context;
	use clap::Parser;
	use inkpatch::engine::{DetachedHost, InkCanvas, ManualFrames, Recording};

	let args = Args::parse();

	if let Err(error) = configure_logging() {
		eprintln!("logging unavailable: {error}");
	}

	let input = args.input.display();
	let output = args.output.display();
	let json = std::fs::read_to_string(&args.input).with_context(|| format!("reading {input}"))?;
	let recording = Recording::from_json(&json).with_context(|| format!("parsing {input}"))?;
	let strokes = recording.strokes.len();
	let mut canvas = InkCanvas::from_recording(recording, ManualFrames, DetachedHost)?;

	let png = pollster::block_on(canvas.export_png()).context("recording has an empty surface")?;
	std::fs::write(&args.output, &png).with_context(|| format!("writing {output}"))?;
	tracing::info!(strokes, bytes = png.len(), %output, "wrote replay");
	Ok(())
}

#[cfg(all(test, not(feature = "csr")))]
mod tests {
	use super::*;
	use clap::{CommandFactory, Parser};

	#[test]
	fn command_is_well_formed() {
		Args::command().debug_assert();
	}

	#[test]
	fn takes_exactly_two_paths() {
		let args = Args::try_parse_from(["inkpatch", "in.json", "out.png"]).unwrap();
		assert_eq!(args.input, std::path::Path::new("in.json"));
		assert_eq!(args.output, std::path::Path::new("out.png"));

		assert!(Args::try_parse_from(["inkpatch", "in.json"]).is_err());
		assert!(Args::try_parse_from(["inkpatch", "a", "b", "c"]).is_err());
		let help = Args::try_parse_from(["inkpatch", "--help"]).unwrap_err();
		assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
	}
}
