use serde::Serialize;

/// A `{ ideal: value }` constraint, the form `getUserMedia` treats as a preference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Ideal<T> {
    pub ideal: T,
}

impl<T> Ideal<T> {
    pub fn new(ideal: T) -> Self {
        Self { ideal }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: String,
    pub frame_rate: Ideal<u32>,
    pub width: Ideal<u32>,
    pub height: Ideal<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub sample_rate: Ideal<u32>,
    pub sample_size: Ideal<u32>,
    pub channel_count: Ideal<u32>,
    pub echo_cancellation: Ideal<bool>,
    pub noise_suppression: Ideal<bool>,
}

/// Constraints passed to `getUserMedia`: a small, slow front camera and narrowband mono audio,
/// enough for thumbnails and voice clips.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: VideoConstraints {
                facing_mode: "user".to_string(),
                frame_rate: Ideal::new(5),
                width: Ideal::new(320),
                height: Ideal::new(180),
            },
            audio: AudioConstraints {
                sample_rate: Ideal::new(16_000),
                sample_size: Ideal::new(8),
                channel_count: Ideal::new(1),
                echo_cancellation: Ideal::new(true),
                noise_suppression: Ideal::new(true),
            },
        }
    }
}
