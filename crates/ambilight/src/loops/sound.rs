//! Sound mode block handler
//!
//! Runs inside the audio callback, so it never touches the network: the
//! command goes onto the drop-oldest queue and the sender thread does the
//! write. Sound output is deliberately left unsmoothed.

use ambilight_control::CommandProducer;
use ambilight_core::{ColorCommand, SpectralColorMapper, SpectrumAnalyzer};
use tracing::trace;

pub struct SoundBlockHandler {
    analyzer: SpectrumAnalyzer,
    mapper: SpectralColorMapper,
    brightness: u8,
    producer: CommandProducer,
}

impl SoundBlockHandler {
    pub fn new(
        block_size: usize,
        sample_rate: u32,
        brightness: u8,
        producer: CommandProducer,
    ) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(block_size, sample_rate),
            mapper: SpectralColorMapper::new(),
            brightness,
            producer,
        }
    }

    /// Analyse one mono block and enqueue its command
    pub fn handle_block(&mut self, samples: &[f32]) -> ColorCommand {
        let spectrum = self.analyzer.analyze(samples);
        let command = self.mapper.command(&spectrum, self.brightness);
        if !self.producer.push(command) {
            trace!("send queue closed; dropping {}", command);
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambilight_control::{command_queue, CommandSink, Result as ControlResult};
    use std::f32::consts::PI;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<ColorCommand>>>);

    impl CommandSink for Collect {
        fn send(&mut self, command: &ColorCommand) -> ControlResult<()> {
            self.0.lock().unwrap().push(*command);
            Ok(())
        }
    }

    fn tone(bin: usize, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
            .collect()
    }

    #[test]
    fn test_blocks_become_queued_commands() {
        let (producer, consumer) = command_queue(8);
        let sink = Collect::default();
        let seen = sink.0.clone();
        let sender = consumer.spawn(sink).unwrap();

        let mut handler = SoundBlockHandler::new(1024, 44_100, 200, producer);
        let bass = handler.handle_block(&tone(4, 1024));
        let silence = handler.handle_block(&[0.0; 1024]);
        drop(handler);
        sender.join().unwrap();

        assert!(bass.r > 250);
        assert_eq!(bass.brightness, 200);
        assert_eq!(silence.rgb(), [0, 0, 0]);
        assert_eq!(*seen.lock().unwrap(), vec![bass, silence]);
    }

    #[test]
    fn test_full_queue_never_blocks() {
        let (producer, _consumer) = command_queue(1);
        let mut handler = SoundBlockHandler::new(256, 8_000, 200, producer.clone());
        for _ in 0..10 {
            handler.handle_block(&[0.0; 256]);
        }
        assert_eq!(producer.len(), 1);
        assert_eq!(producer.dropped(), 9);
    }
}
