#![no_main]

use libfuzzer_sys::fuzz_target;
use wallframe_images::{decode_with_config, DecoderConfig};

fuzz_target!(|data: &[u8]| {
    // Keep canvases small so large declared dimensions fail fast.
    let config = DecoderConfig::new().with_max_pixels(1 << 20);

    if let Ok(image) = decode_with_config(data, &config) {
        let expected = image.width() as usize * image.height() as usize;
        assert!(!image.frames().is_empty());
        for frame in image.frames() {
            assert_eq!(frame.pixels().len(), expected);
            assert!(frame.duration_ms() > 0);
        }
    }
});
