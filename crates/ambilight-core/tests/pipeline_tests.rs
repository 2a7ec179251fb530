//! End-to-end behavior of the visual pipeline

use ambilight_core::{
    BrightnessMapper, ColorPipeline, Frame, HueBoost, LinearSample, Mode, ModeOverrides,
    ModeProfile, ModeProfiles, SampleAggregator,
};
use ambilight_core::color::srgb8_to_linear;
use proptest::prelude::*;

fn plain(mode: Mode) -> ModeProfile {
    ModeProfile {
        saturation_boost: 1.0,
        gain: [1.0, 1.0, 1.0],
        hue_boost: HueBoost {
            range: (0.12, 0.45),
            multiplier: 1.0,
        },
        ..ModeProfile::defaults(mode)
    }
}

#[test]
fn pure_red_frame_passes_through_unchanged() {
    let mut pipeline = ColorPipeline::new(plain(Mode::Ambient)).unwrap();
    let command = pipeline.process(&Frame::filled(1920, 1080, [255, 0, 0]));
    assert_eq!(command.rgb(), [255, 0, 0]);
    assert_eq!(command.brightness, 255);
}

#[test]
fn black_frame_sits_at_brightness_floor() {
    let black = Frame::filled(640, 360, [0, 0, 0]);

    let mut ambient = ColorPipeline::new(ModeProfile::defaults(Mode::Ambient)).unwrap();
    let command = ambient.process(&black);
    assert_eq!(command.rgb(), [0, 0, 0]);
    assert_eq!(command.brightness, 60);

    let mut gaming = ColorPipeline::new(ModeProfile::defaults(Mode::Gaming)).unwrap();
    let command = gaming.process(&black);
    assert_eq!(command.rgb(), [0, 0, 0]);
    assert_eq!(command.brightness, 100);

    let mut movie = ColorPipeline::new(ModeProfile::defaults(Mode::Movie)).unwrap();
    assert_eq!(movie.process(&black).brightness, 60);
}

#[test]
fn constant_input_converges_to_its_own_color() {
    let target = Frame::filled(320, 180, [30, 140, 200]);

    for mode in [Mode::Ambient, Mode::Gaming, Mode::Movie] {
        let profile = ModeProfile::defaults(mode);
        let alpha = profile.smoothing;

        let mut reference = ColorPipeline::new(profile.clone()).unwrap();
        let steady = reference.process(&target);

        let mut pipeline = ColorPipeline::new(profile).unwrap();
        pipeline.process(&Frame::filled(320, 180, [255, 255, 255]));
        let mut last = None;
        for _ in 0..400 {
            last = Some(pipeline.process(&target));
        }
        let last = last.unwrap();

        for (got, want) in last.rgb().iter().zip(steady.rgb()) {
            let gap = (*got as f64 - want as f64).abs();
            assert!(gap < 1.0 / (1.0 - alpha), "{mode}: {last} vs {steady}");
        }
        assert_eq!(last.brightness, steady.brightness, "{mode}");
    }
}

#[test]
fn first_frame_is_not_smoothed() {
    let profile = ModeProfile::defaults(Mode::Ambient);
    let frame = Frame::filled(64, 36, [200, 40, 90]);

    let mut heavy = ColorPipeline::new(ModeProfile {
        smoothing: 0.99,
        ..profile.clone()
    })
    .unwrap();
    let mut none = ColorPipeline::new(ModeProfile {
        smoothing: 0.0,
        ..profile
    })
    .unwrap();

    assert_eq!(heavy.process(&frame), none.process(&frame));
}

#[test]
fn gaming_pre_blend_of_identical_frames_is_a_no_op() {
    let frame = Frame::from_fn(200, 120, |x, y| [(x % 256) as u8, (y * 2) as u8, 180]);

    for reactive_alpha in [0.1, 0.5, 0.75, 1.0] {
        let profile = ModeProfile::defaults(Mode::Gaming).with_overrides(&ModeOverrides {
            reactive_alpha: Some(reactive_alpha),
            ..Default::default()
        });
        let aggregator = SampleAggregator::new(&profile);

        let first = aggregator.aggregate(&frame, None);
        let second = aggregator.aggregate(&frame, Some(first));
        for (a, b) in first.channels().iter().zip(second.channels()) {
            assert!((a - b).abs() < 1e-12, "alpha={reactive_alpha}");
        }
    }
}

#[test]
fn gaming_only_sees_the_center_of_the_display() {
    // White center quarter-area on a red surround
    let frame = Frame::from_fn(400, 400, |x, y| {
        if (100..300).contains(&x) && (100..300).contains(&y) {
            [255, 255, 255]
        } else {
            [255, 0, 0]
        }
    });
    let profile = ModeProfile::defaults(Mode::Gaming);
    let sample = SampleAggregator::new(&profile).aggregate(&frame, None);
    assert!((sample.g - 1.0).abs() < 1e-12);
    assert!((sample.b - 1.0).abs() < 1e-12);
}

#[test]
fn movie_weights_the_center_more_than_ambient() {
    let frame = Frame::from_fn(96, 56, |x, y| {
        let dx = x as i32 - 48;
        let dy = y as i32 - 28;
        if dx * dx + dy * dy < 100 {
            [255, 255, 255]
        } else {
            [0, 0, 0]
        }
    });

    let ambient = ModeProfile::defaults(Mode::Ambient);
    let movie = ModeProfile::defaults(Mode::Movie);
    let flat = SampleAggregator::new(&ambient).aggregate(&frame, None);
    let weighted = SampleAggregator::new(&movie).aggregate(&frame, None);
    assert!(weighted.r > flat.r);
}

#[test]
fn single_pixel_display_is_safe_in_every_mode() {
    let frame = Frame::filled(1, 1, [128, 0, 255]);
    for mode in [Mode::Ambient, Mode::Gaming, Mode::Movie] {
        let profile = ModeProfile::defaults(mode);
        let sample = SampleAggregator::new(&profile).aggregate(&frame, None);
        let expected = LinearSample::new(srgb8_to_linear(128), 0.0, 1.0);
        for (got, want) in sample.channels().iter().zip(expected.channels()) {
            assert!((got - want).abs() < 1e-12, "{mode}");
        }

        let mut pipeline = ColorPipeline::new(profile).unwrap();
        let _ = pipeline.process(&frame);
    }
}

#[test]
fn overridden_profiles_drive_the_pipeline() {
    let overrides = ModeOverrides {
        brightness_floor: Some(10),
        brightness_span: Some(100),
        ..Default::default()
    };
    let profiles = ModeProfiles::with_overrides([(Mode::Ambient, &overrides)]).unwrap();

    let mut pipeline = ColorPipeline::new(profiles.get(Mode::Ambient).clone()).unwrap();
    assert_eq!(pipeline.process(&Frame::filled(8, 8, [0, 0, 0])).brightness, 10);
    assert_eq!(pipeline.process(&Frame::filled(8, 8, [255, 255, 255])).brightness, 110);
}

proptest! {
    #[test]
    fn brightness_stays_in_declared_range(
        pixels in prop::collection::vec(any::<[u8; 3]>(), 1..64),
        boost in 0.0f64..5.0,
        gain in 0.01f64..5.0,
        mode_index in 0usize..3,
    ) {
        let mode = [Mode::Ambient, Mode::Gaming, Mode::Movie][mode_index];
        let width = pixels.len() as u32;
        let frame = Frame::new(width, 1, pixels).unwrap();
        let profile = ModeProfile {
            saturation_boost: boost,
            gain: [gain, gain, gain],
            ..ModeProfile::defaults(mode)
        };
        let (low, high) = BrightnessMapper::for_profile(&profile).range();

        let mut pipeline = ColorPipeline::new(profile).unwrap();
        for _ in 0..3 {
            let command = pipeline.process(&frame);
            prop_assert!(low <= command.brightness && command.brightness <= high);
        }
    }
}
