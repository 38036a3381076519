/// Sound engine: procedural chiptune effects via rodio.
///
/// All sounds are synthesized into in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_cast: Arc<Vec<u8>>,
        sfx_pickup: Arc<Vec<u8>>,
        sfx_key: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_hurt: Arc<Vec<u8>>,
        sfx_death: Arc<Vec<u8>>,
        sfx_fanfare: Arc<Vec<u8>>,
        sfx_alarm: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let wav = |s: Vec<f32>| Arc::new(make_wav(&s));

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_cast: wav(sweep(300.0, 900.0, 0.08, 0.0, 0.2)),
                sfx_pickup: wav(notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.045)], Timbre::Square, 0.25)),
                sfx_key: wav(notes(&[(784.0, 0.08), (1047.0, 0.15)], Timbre::Bell, 0.3)),
                sfx_hit: wav(sweep(220.0, 90.0, 0.06, 0.6, 0.3)),
                sfx_hurt: wav(sweep(400.0, 150.0, 0.15, 0.3, 0.3)),
                sfx_death: wav(notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.24)], Timbre::Sine, 0.3)),
                sfx_fanfare: wav(notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], Timbre::Bell, 0.3)),
                sfx_alarm: wav(notes(&[(180.0, 0.12), (140.0, 0.12), (180.0, 0.12), (140.0, 0.2)], Timbre::Square, 0.3)),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_cast(&self) { self.play(&self.sfx_cast); }
        pub fn play_pickup(&self) { self.play(&self.sfx_pickup); }
        pub fn play_key(&self) { self.play(&self.sfx_key); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_hurt(&self) { self.play(&self.sfx_hurt); }
        pub fn play_death(&self) { self.play(&self.sfx_death); }
        pub fn play_fanfare(&self) { self.play(&self.sfx_fanfare); }
        pub fn play_alarm(&self) { self.play(&self.sfx_alarm); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    #[derive(Clone, Copy)]
    enum Timbre {
        Sine,
        /// Sine plus third harmonic, retro square-ish.
        Square,
        /// Octave and twelfth overtones.
        Bell,
    }

    fn voice(timbre: Timbre, phase: f32) -> f32 {
        match timbre {
            Timbre::Sine => phase.sin(),
            Timbre::Square => phase.sin() * 0.7 + (phase * 3.0).sin() * 0.3,
            Timbre::Bell => phase.sin() * 0.6 + (phase * 2.0).sin() * 0.3 + (phase * 3.0).sin() * 0.1,
        }
    }

    /// Note sequence, each note decaying over its own length.
    fn notes(seq: &[(f32, f32)], timbre: Timbre, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.7);
                samples.push(voice(timbre, t * freq * TAU) * env * volume);
            }
        }
        samples
    }

    /// Linear pitch sweep blended with LCG noise (`noise` in 0..=1).
    fn sweep(from: f32, to: f32, duration: f32, noise: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 12345;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * TAU / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let hiss = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.8);
                (phase.sin() * (1.0 - noise) + hiss * noise) * env * volume
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_sizes_match_samples() {
            let wav = make_wav(&[0.0, 1.0, -2.0]);
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
            assert_eq!(i16::from_le_bytes([wav[48], wav[49]]), -32767);
        }

        #[test]
        fn generators_stay_in_range() {
            let seq = notes(&[(440.0, 0.05), (880.0, 0.05)], Timbre::Bell, 0.3);
            assert_eq!(seq.len(), 2 * (SAMPLE_RATE as f32 * 0.05) as usize);
            let swept = sweep(200.0, 100.0, 0.1, 0.5, 0.3);
            assert!(seq.iter().chain(&swept).all(|s| s.abs() <= 0.31));
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_cast(&self) {}
    pub fn play_pickup(&self) {}
    pub fn play_key(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_hurt(&self) {}
    pub fn play_death(&self) {}
    pub fn play_fanfare(&self) {}
    pub fn play_alarm(&self) {}
}
