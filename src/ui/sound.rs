/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use rand::Rng;

use crate::sim::event::GameEvent;

/// Pellet pickups rotate through this many pitch variants.
pub const PELLET_VARIANTS: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    /// Played once at the start of every run, restarts included.
    Start,
    Pellet(usize),
    Growl,
    Sword,
    Scream,
    Chomp,
    GameOver,
    Fanfare,
}

/// Effects for one tick's events, in play order.
pub fn effects_for<R: Rng>(events: &[GameEvent], rng: &mut R) -> Vec<Sfx> {
    let mut out = vec![];
    for ev in events {
        match ev {
            GameEvent::ItemConsumed { .. } => out.push(Sfx::Pellet(rng.gen_range(0..PELLET_VARIANTS))),
            GameEvent::AdversaryFleeing => out.push(Sfx::Growl),
            GameEvent::AdversaryDefeated => out.extend([Sfx::Sword, Sfx::Scream]),
            GameEvent::TributesConsumed { .. } => out.extend([Sfx::Chomp, Sfx::Scream]),
            GameEvent::PlayerKilled => out.push(Sfx::GameOver),
            GameEvent::Victory => out.push(Sfx::Fanfare),
        }
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::{Sfx, PELLET_VARIANTS};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        start: Arc<Vec<u8>>,
        pellets: Vec<Arc<Vec<u8>>>,
        growl: Arc<Vec<u8>>,
        sword: Arc<Vec<u8>>,
        scream: Arc<Vec<u8>>,
        chomp: Arc<Vec<u8>>,
        game_over: Arc<Vec<u8>>,
        fanfare: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            let pellets = (0..PELLET_VARIANTS)
                .map(|i| Arc::new(make_wav(&gen_pellet(i))))
                .collect();

            Some(SoundEngine {
                _stream: stream,
                handle,
                start: Arc::new(make_wav(&gen_start())),
                pellets,
                growl: Arc::new(make_wav(&gen_growl())),
                sword: Arc::new(make_wav(&gen_sword())),
                scream: Arc::new(make_wav(&gen_scream())),
                chomp: Arc::new(make_wav(&gen_chomp())),
                game_over: Arc::new(make_wav(&gen_game_over())),
                fanfare: Arc::new(make_wav(&gen_fanfare())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Start => &self.start,
                Sfx::Pellet(i) => match self.pellets.get(i) {
                    Some(b) => b,
                    None => return,
                },
                Sfx::Growl => &self.growl,
                Sfx::Sword => &self.sword,
                Sfx::Scream => &self.scream,
                Sfx::Chomp => &self.chomp,
                Sfx::GameOver => &self.game_over,
                Sfx::Fanfare => &self.fanfare,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Start: two quick low notes, then a rising run into a held fifth.
    fn gen_start() -> Vec<f32> {
        let notes = [
            (262.0_f32, 0.08), (0.0, 0.04), (262.0, 0.08), (0.0, 0.04),
            (330.0, 0.08), (392.0, 0.08), (523.0, 0.08), (784.0, 0.3),
        ];
        let mut out = Vec::new();
        for &(freq, dur) in &notes {
            let n = samples(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(0.6);
                let wave = (t * freq * 2.0 * PI).sin() * 0.7 + (t * freq * 2.0 * 2.0 * PI).sin() * 0.3;
                out.push(wave * env * 0.3);
            }
        }
        out
    }

    /// Pellet: short square-ish blip, pitch depends on the variant.
    fn gen_pellet(variant: usize) -> Vec<f32> {
        let freq = [880.0_f32, 988.0, 1109.0][variant % 3];
        let n = samples(0.05);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * PI).sin() * 0.7 + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                wave * env * 0.2
            })
            .collect()
    }

    /// Growl: low rumble with noise, rising then falling.
    fn gen_growl() -> Vec<f32> {
        let n = samples(0.6);
        let mut rng: u32 = 4242;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 70.0 + (p * PI).sin() * 40.0;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (p * PI).sin();
                ((t * freq * 2.0 * PI).sin() * 0.6 + noise * 0.4) * env * 0.4
            })
            .collect()
    }

    /// Sword: bright metallic ring.
    fn gen_sword() -> Vec<f32> {
        let n = samples(0.3);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(2.0);
                let wave = (t * 2093.0 * 2.0 * PI).sin() * 0.5
                    + (t * 3136.0 * 2.0 * PI).sin() * 0.3
                    + (t * 4699.0 * 2.0 * PI).sin() * 0.2;
                wave * env * 0.25
            })
            .collect()
    }

    /// Scream: wavering descending tone.
    fn gen_scream() -> Vec<f32> {
        let n = samples(0.45);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 900.0 - p * 500.0 + (t * 30.0 * 2.0 * PI).sin() * 60.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - p).powf(0.7);
                (phase * 2.0 * PI).sin() * env * 0.25
            })
            .collect()
    }

    /// Chomp: two short noise bursts.
    fn gen_chomp() -> Vec<f32> {
        let burst = samples(0.06);
        let gap = samples(0.04);
        let mut rng: u32 = 777;
        let mut out = Vec::with_capacity(burst * 2 + gap);
        for b in 0..2 {
            for i in 0..burst {
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = 1.0 - i as f32 / burst as f32;
                out.push(noise * env * 0.35);
            }
            if b == 0 {
                out.extend(std::iter::repeat(0.0).take(gap));
            }
        }
        out
    }

    /// Game over: sad descending tone.
    fn gen_game_over() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let mut out = Vec::new();
        for &freq in &notes {
            let n = samples(0.14);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                out.push((t * freq * 2.0 * PI).sin() * env * 0.3);
            }
        }
        let fade_len = out.len() / 4;
        let total = out.len();
        for (k, s) in out[total - fade_len..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade_len as f32;
        }
        out
    }

    /// Fanfare: ascending arpeggio with a held top note.
    fn gen_fanfare() -> Vec<f32> {
        let notes = [(523.0_f32, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)];
        let mut out = Vec::new();
        for &(freq, dur) in &notes {
            let n = samples(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.5;
                let wave = (t * freq * 2.0 * PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * PI).sin() * 0.3
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.1;
                out.push(wave * env * 0.3);
            }
        }
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let block_align: u16 = bits_per_sample / 8; // mono
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // channels
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
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn events_map_to_effects() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fx = effects_for(
            &[
                GameEvent::AdversaryFleeing,
                GameEvent::AdversaryDefeated,
                GameEvent::TributesConsumed { ids: vec![0, 3] },
                GameEvent::Victory,
            ],
            &mut rng,
        );
        assert_eq!(
            fx,
            vec![Sfx::Growl, Sfx::Sword, Sfx::Scream, Sfx::Chomp, Sfx::Scream, Sfx::Fanfare],
        );
    }

    #[test]
    fn pellet_variant_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let fx = effects_for(&[GameEvent::ItemConsumed { pos: (1, 1) }], &mut rng);
            match fx.as_slice() {
                [Sfx::Pellet(i)] => assert!(*i < PELLET_VARIANTS),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
