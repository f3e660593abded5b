//! Synthesizer seam and the FluidSynth subprocess adapter.
//!
//! FluidSynth is run in fast-render mode: it plays the MIDI file through a
//! SoundFont as fast as possible and writes a WAV file, then exits.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{SynthError, SynthResult};

/// Default timeout for one FluidSynth run (10 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default FluidSynth output gain.
pub const DEFAULT_GAIN: f32 = 0.2;

/// Environment variable overriding the FluidSynth executable.
pub const FLUIDSYNTH_PATH_ENV: &str = "FLUIDSYNTH_PATH";

/// Environment variable overriding the SoundFont.
pub const SOUNDFONT_ENV: &str = "TONEGEN_SOUNDFONT";

/// Renders a MIDI file to an audio file.
///
/// Implementations may write any channel count; callers downmix to mono.
pub trait Synthesizer {
    /// Short name for reports.
    fn name(&self) -> &str;

    /// Renders `midi` into a WAV file at `audio_out`.
    fn render(&self, midi: &Path, audio_out: &Path, sample_rate: u32) -> SynthResult<()>;
}

/// Configuration for the FluidSynth adapter.
#[derive(Debug, Clone)]
pub struct FluidSynthConfig {
    /// Path to the FluidSynth executable.
    pub fluidsynth_path: Option<PathBuf>,
    /// Path to the SoundFont (`.sf2`).
    pub soundfont: Option<PathBuf>,
    /// Output gain passed to `-g`.
    pub gain: f32,
    /// Timeout for one FluidSynth run.
    pub timeout: Duration,
    /// Whether to capture FluidSynth's stderr for error reports.
    pub capture_output: bool,
}

impl Default for FluidSynthConfig {
    fn default() -> Self {
        Self {
            fluidsynth_path: None,
            soundfont: None,
            gain: DEFAULT_GAIN,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl FluidSynthConfig {
    /// Sets the FluidSynth executable path.
    pub fn fluidsynth_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fluidsynth_path = Some(path.into());
        self
    }

    /// Sets the SoundFont path.
    pub fn soundfont(mut self, path: impl Into<PathBuf>) -> Self {
        self.soundfont = Some(path.into());
        self
    }

    /// Sets the output gain.
    pub fn gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// The FluidSynth subprocess adapter.
#[derive(Debug, Clone, Default)]
pub struct FluidSynth {
    config: FluidSynthConfig,
}

impl FluidSynth {
    /// Creates an adapter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter with the given configuration.
    pub fn with_config(config: FluidSynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FluidSynthConfig {
        &self.config
    }

    /// Finds the FluidSynth executable.
    ///
    /// Search order: config override, `FLUIDSYNTH_PATH`, `PATH`, common
    /// installation paths.
    pub fn find_fluidsynth(&self) -> SynthResult<PathBuf> {
        // Check config override first
        if let Some(ref path) = self.config.fluidsynth_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var(FLUIDSYNTH_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let names = if cfg!(windows) {
            vec!["fluidsynth.exe", "fluidsynth"]
        } else {
            vec!["fluidsynth"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec![
                "C:\\Program Files\\FluidSynth\\bin\\fluidsynth.exe",
                "C:\\tools\\fluidsynth\\bin\\fluidsynth.exe",
            ]
        } else if cfg!(target_os = "macos") {
            vec!["/opt/homebrew/bin/fluidsynth", "/usr/local/bin/fluidsynth"]
        } else {
            vec!["/usr/bin/fluidsynth", "/usr/local/bin/fluidsynth"]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(SynthError::FluidSynthNotFound)
    }

    /// Finds the SoundFont.
    ///
    /// Search order: config override, `TONEGEN_SOUNDFONT`,
    /// `~/.fluidsynth/default_sound_font.sf2`, common distribution paths.
    pub fn find_soundfont(&self) -> SynthResult<PathBuf> {
        let candidates = self.soundfont_candidates();
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| SynthError::SoundFontNotFound {
                searched: candidates.iter().map(|p| p.display().to_string()).collect(),
            })
    }

    fn soundfont_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(ref path) = self.config.soundfont {
            candidates.push(path.clone());
        }
        if let Some(path) = std::env::var_os(SOUNDFONT_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".fluidsynth")
                    .join("default_sound_font.sf2"),
            );
        }
        candidates.extend(
            [
                "/usr/share/sounds/sf2/FluidR3_GM.sf2",
                "/usr/share/soundfonts/FluidR3_GM.sf2",
                "/usr/share/soundfonts/default.sf2",
                "/usr/local/share/fluidsynth/default.sf2",
                "/opt/homebrew/share/fluidsynth/default.sf2",
            ]
            .iter()
            .map(PathBuf::from),
        );
        candidates
    }

    /// Runs `fluidsynth --version` and returns its first output line.
    pub fn version(&self) -> SynthResult<String> {
        let binary = self.find_fluidsynth()?;
        let output = Command::new(&binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(SynthError::SpawnFailed)?;
        if !output.status.success() {
            return Err(SynthError::process_failed(
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Builds the render command without running it.
    fn command(
        &self,
        binary: &Path,
        soundfont: &Path,
        midi: &Path,
        audio_out: &Path,
        sample_rate: u32,
    ) -> Command {
        // fluidsynth -ni -g <gain> -r <rate> -T wav -F <out> <soundfont> <midi>
        let mut cmd = Command::new(binary);
        cmd.arg("-ni")
            .arg("-g")
            .arg(self.config.gain.to_string())
            .arg("-r")
            .arg(sample_rate.to_string())
            .arg("-T")
            .arg("wav")
            .arg("-F")
            .arg(audio_out)
            .arg(soundfont)
            .arg(midi)
            .stdin(Stdio::null());

        if self.config.capture_output {
            // Only stderr is reported
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }
        cmd
    }
}

impl Synthesizer for FluidSynth {
    fn name(&self) -> &str {
        "fluidsynth"
    }

    fn render(&self, midi: &Path, audio_out: &Path, sample_rate: u32) -> SynthResult<()> {
        let binary = self.find_fluidsynth()?;
        let soundfont = self.find_soundfont()?;

        let child = self
            .command(&binary, &soundfont, midi, audio_out, sample_rate)
            .spawn()
            .map_err(SynthError::SpawnFailed)?;

        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(SynthError::process_failed(exit_code, stderr));
        }

        if !audio_out.is_file() {
            return Err(SynthError::OutputNotFound {
                path: audio_out.to_path_buf(),
            });
        }

        Ok(())
    }
}

/// Waits for `child`, killing it after `timeout`.
///
/// Stderr is drained on a separate thread while waiting so a child that
/// writes more than the pipe buffer holds cannot stall.
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> SynthResult<(ExitStatus, String)> {
    let start = Instant::now();

    let stderr_reader = child
        .stderr
        .take()
        .filter(|_| capture_output)
        .map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SynthError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(SynthError::SpawnFailed(e)),
        }
    };

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    Ok((status, stderr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FluidSynthConfig::default()
            .fluidsynth_path("/usr/bin/fluidsynth")
            .soundfont("/tmp/font.sf2")
            .gain(0.5)
            .timeout_secs(30);

        assert_eq!(config.fluidsynth_path, Some(PathBuf::from("/usr/bin/fluidsynth")));
        assert_eq!(config.soundfont, Some(PathBuf::from("/tmp/font.sf2")));
        assert_eq!(config.gain, 0.5);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.capture_output);
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(
            FluidSynthConfig::default().timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_command_arguments() {
        let synth = FluidSynth::with_config(FluidSynthConfig::default().gain(0.5));
        let cmd = synth.command(
            Path::new("fluidsynth"),
            Path::new("font.sf2"),
            Path::new("in.midi"),
            Path::new("out.wav"),
            22050,
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["-ni", "-g", "0.5", "-r", "22050", "-T", "wav", "-F", "out.wav", "font.sf2", "in.midi"]
        );
    }

    #[test]
    fn test_configured_soundfont_is_preferred() {
        let tmp = tempfile::tempdir().unwrap();
        let font = tmp.path().join("font.sf2");
        std::fs::write(&font, b"sfbk").unwrap();

        let synth = FluidSynth::with_config(FluidSynthConfig::default().soundfont(&font));
        assert_eq!(synth.find_soundfont().unwrap(), font);
    }

    #[test]
    fn test_soundfont_candidates_start_with_override() {
        let synth =
            FluidSynth::with_config(FluidSynthConfig::default().soundfont("/nowhere/font.sf2"));
        let candidates = synth.soundfont_candidates();
        assert_eq!(candidates[0], PathBuf::from("/nowhere/font.sf2"));
        assert!(candidates
            .iter()
            .any(|p| p.ends_with("FluidR3_GM.sf2")));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_captures_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello 1>&2"]);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let child = cmd.spawn().unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(2), true).unwrap();
        assert!(status.success());
        assert!(stderr.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_drains_large_stderr() {
        // Well past the pipe buffer
        let child = Command::new("sh")
            .args(["-c", "yes warning | head -c 200000 1>&2"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let start = Instant::now();
        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(20), true).unwrap();
        assert!(status.success());
        assert_eq!(stderr.len(), 200_000);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_kills_slow_process() {
        let child = Command::new("sh")
            .args(["-c", "sleep 5"])
            .spawn()
            .unwrap();
        let err = wait_with_timeout(child, Duration::from_millis(200), false).unwrap_err();
        assert!(matches!(err, SynthError::Timeout { .. }));
    }
}
