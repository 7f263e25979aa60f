//! 대표 색상 추출.
//!
//! 작업 해상도로 샘플링한 픽셀에 k-means를 적용해 `k`개의 색상을 고른다.
//!
//! 1. 작업 해상도(기본 100x100)로 축소 — 성능용 샘플링, 전체 해상도 팔레트의 근사
//! 2. 반투명 픽셀과 거의 검정/흰색 픽셀 제외
//! 3. 남은 픽셀이 없으면 고정 폴백 팔레트 (에러 아님)
//! 4. 서로 다른 랜덤 픽셀 `k`개로 중심 초기화
//! 5. 고정 횟수 반복: 최근접 중심 할당 → 평균 재계산 (빈 클러스터는 유지)
//! 6. 임계 거리 이하의 중복 중심 제거
//! 7. 랜덤 색상으로 채우거나 잘라서 정확히 `k`개 반환
//!
//! 결과 순서는 클러스터 처리 순서이며 지배도 순위가 아니다.
//! 난수 소스는 호출 측이 주입한다 (시드 고정 시 재현 가능).

use std::fmt;

use atelier_core::config::VisionConfig;
use atelier_core::error::CoreError;
use image::imageops::FilterType;
use image::DynamicImage;
use rand::Rng;
use tracing::debug;

/// 샘플 픽셀이 하나도 남지 않을 때의 폴백 팔레트
pub const FALLBACK_PALETTE: [Rgb; 5] = [
    Rgb::new(0xff, 0x6b, 0x6b), // coral
    Rgb::new(0x4e, 0xcd, 0xc4), // teal
    Rgb::new(0x45, 0xb7, 0xd1), // sky
    Rgb::new(0x96, 0xce, 0xb4), // sage
    Rgb::new(0xff, 0xea, 0xa7), // cream
];

/// RGB 색상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` 소문자 hex
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `#rrggbb` 또는 `rrggbb` 파싱
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// RGB 공간 유클리드 거리
    pub fn distance(self, other: Rgb) -> f32 {
        distance(&self.to_point(), &other.to_point())
    }

    fn to_point(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    fn from_point(point: &[f32; 3]) -> Self {
        let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(point[0]), channel(point[1]), channel(point[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// 팔레트 추출 옵션
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteOptions {
    /// 색상 수
    pub k: usize,
    /// 작업 해상도 (정사각형 변 길이)
    pub working_resolution: u32,
    /// k-means 반복 횟수
    pub iterations: usize,
    /// 중복 제거 임계 거리
    pub dedup_threshold: f32,
    /// 이 값 미만의 알파는 제외
    pub min_alpha: u8,
    /// r+g+b 가 이 값 미만이면 제외 (거의 검정)
    pub min_channel_sum: u16,
    /// r+g+b 가 이 값 초과면 제외 (거의 흰색)
    pub max_channel_sum: u16,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            k: 5,
            working_resolution: 100,
            iterations: 10,
            dedup_threshold: 30.0,
            min_alpha: 125,
            min_channel_sum: 50,
            max_channel_sum: 700,
        }
    }
}

impl From<&VisionConfig> for PaletteOptions {
    fn from(config: &VisionConfig) -> Self {
        Self {
            k: config.palette_size,
            working_resolution: config.working_resolution,
            iterations: config.kmeans_iterations,
            dedup_threshold: config.dedup_threshold,
            ..Self::default()
        }
    }
}

/// 원본 바이트에서 대표 색상 추출
///
/// 디코딩 실패만 에러다. 샘플이 모두 걸러지면 폴백 팔레트를 반환한다.
pub fn extract_dominant_colors<R: Rng + ?Sized>(
    image_bytes: &[u8],
    options: &PaletteOptions,
    rng: &mut R,
) -> Result<Vec<Rgb>, CoreError> {
    let image = crate::decode_image(image_bytes)?;
    Ok(dominant_colors(&image, options, rng))
}

/// 디코딩된 이미지에서 정확히 `options.k`개의 대표 색상 추출
pub fn dominant_colors<R: Rng + ?Sized>(
    image: &DynamicImage,
    options: &PaletteOptions,
    rng: &mut R,
) -> Vec<Rgb> {
    let k = options.k;
    if k == 0 {
        return Vec::new();
    }

    let samples = sample_pixels(image, options);
    if samples.is_empty() {
        debug!("유효 샘플 없음 → 폴백 팔레트 ({k}색)");
        return fallback_palette(k);
    }

    let centers = kmeans(&samples, k, options.iterations, rng);
    let mut palette = dedup_centers(&centers, options.dedup_threshold);
    let distinct = palette.len();

    while palette.len() < k {
        palette.push(random_color(rng));
    }
    palette.truncate(k);

    debug!(
        "팔레트 추출: 샘플 {}개, 고유 중심 {}개, 랜덤 보충 {}개",
        samples.len(),
        distinct,
        k.saturating_sub(distinct)
    );

    palette
}

/// 길이 `k`의 폴백 팔레트 (기본 5색 순환)
pub fn fallback_palette(k: usize) -> Vec<Rgb> {
    FALLBACK_PALETTE.iter().copied().cycle().take(k).collect()
}

/// hex 문자열 목록으로 변환
pub fn to_hex_palette(colors: &[Rgb]) -> Vec<String> {
    colors.iter().map(|c| c.to_hex()).collect()
}

/// 작업 해상도로 축소 후 필터를 통과한 픽셀 수집
fn sample_pixels(image: &DynamicImage, options: &PaletteOptions) -> Vec<[f32; 3]> {
    if image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let side = options.working_resolution.max(1);
    let working = image.resize_exact(side, side, FilterType::Nearest).to_rgba8();

    working
        .pixels()
        .filter(|p| {
            let [r, g, b, a] = p.0;
            let sum = r as u16 + g as u16 + b as u16;
            a >= options.min_alpha
                && sum >= options.min_channel_sum
                && sum <= options.max_channel_sum
        })
        .map(|p| [p.0[0] as f32, p.0[1] as f32, p.0[2] as f32])
        .collect()
}

/// k-means — 중심 수는 `min(k, samples.len())`
fn kmeans<R: Rng + ?Sized>(
    samples: &[[f32; 3]],
    k: usize,
    iterations: usize,
    rng: &mut R,
) -> Vec<[f32; 3]> {
    let count = k.min(samples.len());
    let mut centers: Vec<[f32; 3]> = rand::seq::index::sample(rng, samples.len(), count)
        .iter()
        .map(|i| samples[i])
        .collect();

    let mut sums = vec![[0f64; 3]; count];
    let mut members = vec![0usize; count];

    for _ in 0..iterations {
        sums.iter_mut().for_each(|s| *s = [0.0; 3]);
        members.iter_mut().for_each(|m| *m = 0);

        for point in samples {
            let nearest = nearest_center(&centers, point);
            for (c, value) in point.iter().enumerate() {
                sums[nearest][c] += *value as f64;
            }
            members[nearest] += 1;
        }

        // 빈 클러스터는 이전 중심 유지 (재시드 없음)
        for ((center, sum), &n) in centers.iter_mut().zip(&sums).zip(&members) {
            if n > 0 {
                for c in 0..3 {
                    center[c] = (sum[c] / n as f64) as f32;
                }
            }
        }
    }

    centers
}

/// 가장 가까운 중심 인덱스 (동률이면 앞쪽)
fn nearest_center(centers: &[[f32; 3]], point: &[f32; 3]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let d = distance(center, point);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// 탐욕적 중복 제거 — 이미 채택된 모든 색과의 거리가 임계값 초과일 때만 채택
pub fn dedup_centers(centers: &[[f32; 3]], threshold: f32) -> Vec<Rgb> {
    let mut kept: Vec<Rgb> = Vec::with_capacity(centers.len());
    for center in centers {
        let color = Rgb::from_point(center);
        if kept.iter().all(|k| k.distance(color) > threshold) {
            kept.push(color);
        }
    }
    kept
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb::new(rng.random(), rng.random(), rng.random())
}

fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt()
}
