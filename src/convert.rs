//! Audio normalization via ffmpeg.
//!
//! Telegram delivers OGG Opus, MP3 and MP4 containers; ffmpeg decodes all
//! of them, so the rest of the pipeline only ever sees PCM wav.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// A wav file of just the RIFF header holds no audio.
const WAV_HEADER_LEN: u64 = 44;

/// Decode `source` and re-encode it as 16-bit PCM wav at `target`.
///
/// Channel count and sample rate are left as ffmpeg decodes them. On any
/// failure the target file is removed before the error propagates, so a
/// partial wav is never left behind for cleanup to misjudge.
pub async fn to_wav(source: &Path, target: &Path) -> Result<(), String> {
    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(source)
        .args(["-acodec", "pcm_s16le", "-y"])
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| format!("failed to run ffmpeg: {e}"))?;

    if !output.status.success() {
        discard_partial(target).await;
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "ffmpeg failed on {}: {}",
            source.display(),
            last_line(&stderr)
        ));
    }

    // ffmpeg exits zero on an empty input but writes a header-only file.
    let size = tokio::fs::metadata(target).await.map(|m| m.len()).unwrap_or(0);
    if size <= WAV_HEADER_LEN {
        discard_partial(target).await;
        return Err(format!("ffmpeg produced no audio for {}", source.display()));
    }

    debug!("normalized {} -> {} ({size} bytes)", source.display(), target.display());
    Ok(())
}

async fn discard_partial(target: &Path) {
    let _ = tokio::fs::remove_file(target).await;
}

/// ffmpeg puts the actual diagnostic on the last non-empty stderr line.
fn last_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no diagnostic output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_picks_final_diagnostic() {
        let stderr = "ffmpeg version 6.0\nInput #0\nfile.mp3: Invalid data found\n\n";
        assert_eq!(last_line(stderr), "file.mp3: Invalid data found");
    }

    #[test]
    fn last_line_handles_empty_output() {
        assert_eq!(last_line(""), "no diagnostic output");
    }

    // Conversion tests shell out to a real ffmpeg.
    // Run with: cargo test --features integ_test
    #[cfg(feature = "integ_test")]
    mod integ {
        use std::path::Path;

        use hound::{SampleFormat, WavSpec, WavWriter};
        use tempfile::tempdir;

        use super::super::{WAV_HEADER_LEN, to_wav};

        /// One second of 16kHz mono tone, enough for ffmpeg to chew on.
        fn write_tone(path: &Path) {
            let spec = WavSpec {
                channels: 1,
                sample_rate: 16_000,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            let mut writer = WavWriter::create(path, spec).unwrap();
            for n in 0..16_000u32 {
                let sample = ((n as f32 * 0.05).sin() * 8000.0) as i16;
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }

        #[tokio::test]
        async fn converts_valid_source() {
            let dir = tempdir().unwrap();
            let source = dir.path().join("in.wav");
            let target = dir.path().join("out.wav");
            write_tone(&source);

            to_wav(&source, &target).await.expect("conversion should succeed");

            let size = std::fs::metadata(&target).unwrap().len();
            assert!(size > WAV_HEADER_LEN, "target holds audio, got {size} bytes");
        }

        #[tokio::test]
        async fn garbage_input_fails_without_leaving_target() {
            let dir = tempdir().unwrap();
            let source = dir.path().join("in.mp3");
            let target = dir.path().join("out.wav");
            std::fs::write(&source, b"this is not audio at all").unwrap();

            let err = to_wav(&source, &target).await.expect_err("garbage must fail");
            assert!(err.contains("ffmpeg"));
            assert!(!target.exists(), "no partial wav may survive a failure");
        }

        #[tokio::test]
        async fn missing_input_fails() {
            let dir = tempdir().unwrap();
            let source = dir.path().join("absent.ogg");
            let target = dir.path().join("out.wav");

            assert!(to_wav(&source, &target).await.is_err());
            assert!(!target.exists());
        }
    }
}
