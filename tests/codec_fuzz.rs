//! Randomized chunking of encoded frame streams.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stomp_engine::{Frame, FrameDecoder, commands, encode_frame};

/// Returns the frame to encode and the frame the decoder should produce.
fn random_frame(rng: &mut StdRng, i: usize) -> (Frame, Frame) {
    let header_value: String = (0..rng.gen_range(0..12))
        .map(|_| match rng.gen_range(0..6) {
            0 => ':',
            1 => '\n',
            2 => '\\',
            3 => 'é',
            _ => rng.gen_range(b'a'..=b'z') as char,
        })
        .collect();

    let frame = match rng.gen_range(0..4) {
        // declared length, arbitrary bytes including NUL
        0 => {
            let body: Vec<u8> = (0..rng.gen_range(0..64)).map(|_| rng.r#gen()).collect();
            commands::send(&format!("/queue/{}", i), body).header("x-note", header_value)
        }
        // binary body without content-length; the encoder must add one
        1 => {
            let mut body: Vec<u8> = (0..rng.gen_range(0..32)).map(|_| rng.r#gen()).collect();
            body.push(0);
            let frame = Frame::new("SEND")
                .header("destination", format!("/queue/{}", i))
                .set_body(body);
            let expected = frame
                .clone()
                .header("content-length", frame.body.len().to_string());
            return (frame, expected);
        }
        // NUL-delimited text body
        2 => {
            let body: Vec<u8> = (0..rng.gen_range(0..64))
                .map(|_| rng.gen_range(b' '..=b'~'))
                .collect();
            Frame::new("MESSAGE")
                .header("message-id", format!("m-{}", i))
                .header("x-note", header_value)
                .set_body(body)
        }
        _ => Frame::new("RECEIPT").header("receipt-id", i.to_string()),
    };
    (frame.clone(), frame)
}

#[test]
fn random_chunking_matches_original_frames() {
    let mut rng = StdRng::seed_from_u64(0x5709);

    for round in 0..50 {
        let (frames, expected): (Vec<Frame>, Vec<Frame>) = (0..rng.gen_range(1..20))
            .map(|i| random_frame(&mut rng, i))
            .unzip();

        let mut stream = Vec::new();
        for f in &frames {
            for _ in 0..rng.gen_range(0..3) {
                stream.push(b'\n');
            }
            stream.extend_from_slice(&encode_frame(f));
        }

        let mut dec = FrameDecoder::new();
        let mut decoded = Vec::new();
        let mut pos = 0;
        while pos < stream.len() {
            let end = (pos + rng.gen_range(1..40)).min(stream.len());
            decoded.extend(dec.feed(&stream[pos..end]));
            pos = end;
        }

        assert_eq!(decoded, expected, "round {}", round);
        assert!(dec.is_idle());
    }
}
