use crate::blog::PostID;
use crate::store::Store;

/// Thumbnail settings used by the post detail page
pub const POST_DETAIL_GEOMETRY: &str = "x700";
pub const POST_DETAIL_CROP: &str = "0%";

/// Longest side a generated thumbnail may have
pub const MAX_THUMB_SIDE: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("invalid geometry {0:?}")]
    Geometry(String),
    #[error("invalid crop origin {0:?}")]
    Crop(String),
    #[error("invalid image name {0:?}")]
    ImageName(String),
    #[error("thumbnail would be {width}x{height}, larger than {MAX_THUMB_SIDE} on a side")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Requested box; a missing side follows the source aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Where the crop box sits, as fractions of the overflow on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropOrigin {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailOptions {
    pub geometry: Geometry,
    pub crop: Option<CropOrigin>,
    pub upscale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Accepts `WxH`, `W` or `xH`
    pub fn parse(geometry: &str) -> Result<Self, ThumbnailError> {
        let invalid = || ThumbnailError::Geometry(geometry.to_owned());
        let side = |s: &str| -> Result<Option<u32>, ThumbnailError> {
            if s.is_empty() {
                return Ok(None);
            }
            match s.parse::<u32>() {
                Ok(0) | Err(_) => Err(invalid()),
                Ok(it) => Ok(Some(it)),
            }
        };

        let (width, height) = match geometry.split_once('x') {
            Some((width, height)) => (side(width)?, side(height)?),
            None => (side(geometry)?, None),
        };

        if width.is_none() && height.is_none() {
            return Err(invalid());
        }

        Ok(Geometry { width, height })
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.width, self.height) {
            (Some(width), Some(height)) => write!(f, "{width}x{height}"),
            (Some(width), None) => write!(f, "{width}"),
            (None, Some(height)) => write!(f, "x{height}"),
            (None, None) => Ok(()),
        }
    }
}

impl CropOrigin {
    pub const CENTER: CropOrigin = CropOrigin { x: 0.5, y: 0.5 };

    /// Accepts `"<x>% <y>%"`, a single percentage for both axes, or
    /// `left`/`center`/`right`/`top`/`bottom` in either slot
    pub fn parse(crop: &str) -> Result<Self, ThumbnailError> {
        let invalid = || ThumbnailError::Crop(crop.to_owned());

        let parse_value = |value: &str| -> Result<(Option<f64>, Option<f64>), ThumbnailError> {
            match value {
                "left" => Ok((Some(0.0), None)),
                "right" => Ok((Some(1.0), None)),
                "top" => Ok((None, Some(0.0))),
                "bottom" => Ok((None, Some(1.0))),
                "center" => Ok((Some(0.5), Some(0.5))),
                _ => {
                    let percent = value
                        .strip_suffix('%')
                        .and_then(|it| it.parse::<f64>().ok())
                        .filter(|it| (0.0..=100.0).contains(it))
                        .ok_or_else(invalid)?;
                    Ok((Some(percent / 100.0), Some(percent / 100.0)))
                }
            }
        };

        let mut parts = crop.split_whitespace();
        let first = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let Some(second) = second else {
            let (x, y) = parse_value(first)?;
            return Ok(CropOrigin {
                x: x.unwrap_or(Self::CENTER.x),
                y: y.unwrap_or(Self::CENTER.y),
            });
        };

        let is_keyword = |value: &str| !value.ends_with('%');
        let (x_first, _) = parse_value(first)?;
        let (_, y_second) = parse_value(second)?;
        // keywords name their own axis, percentages go x then y
        let x = if is_keyword(first) && x_first.is_none() {
            parse_value(second)?.0
        } else {
            x_first
        };
        let y = if is_keyword(second) && y_second.is_none() {
            parse_value(first)?.1
        } else {
            y_second
        };

        Ok(CropOrigin {
            x: x.unwrap_or(Self::CENTER.x),
            y: y.unwrap_or(Self::CENTER.y),
        })
    }
}

impl ThumbnailOptions {
    pub fn post_detail() -> Self {
        ThumbnailOptions {
            geometry: Geometry::parse(POST_DETAIL_GEOMETRY)
                .expect("constant geometry should parse"),
            crop: Some(CropOrigin::parse(POST_DETAIL_CROP).expect("constant crop should parse")),
            upscale: true,
        }
    }

    /// Size after scaling, before cropping
    fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let ratios = [
            self.geometry.width.map(|w| w as f64 / width as f64),
            self.geometry.height.map(|h| h as f64 / height as f64),
        ];
        let ratios = ratios.into_iter().flatten();
        let factor = if self.crop.is_some() {
            ratios.fold(f64::MIN, f64::max)
        } else {
            ratios.fold(f64::MAX, f64::min)
        };

        if factor >= 1.0 && !self.upscale {
            return (width, height);
        }

        (
            ((width as f64 * factor).round() as u32).max(1),
            ((height as f64 * factor).round() as u32).max(1),
        )
    }

    /// Like `scaled_size`, but refuses sizes past `MAX_THUMB_SIDE`
    fn bounded_size(&self, width: u32, height: u32) -> Result<(u32, u32), ThumbnailError> {
        let (width, height) = self.scaled_size(width, height);
        if width > MAX_THUMB_SIDE || height > MAX_THUMB_SIDE {
            return Err(ThumbnailError::TooLarge { width, height });
        }
        Ok((width, height))
    }
}

pub fn create_thumb_static(
    image: image::DynamicImage,
    options: &ThumbnailOptions,
) -> image::DynamicImage {
    let (width, height) = (image.width(), image.height());
    let (scaled_width, scaled_height) = options.scaled_size(width, height);

    let image = if (scaled_width, scaled_height) == (width, height) {
        image
    } else {
        image.resize_exact(scaled_width, scaled_height, image::imageops::Lanczos3)
    };

    let Some(crop) = options.crop else {
        return image;
    };

    let crop_width = options.geometry.width.unwrap_or(scaled_width).min(scaled_width);
    let crop_height = options
        .geometry
        .height
        .unwrap_or(scaled_height)
        .min(scaled_height);
    if (crop_width, crop_height) == (scaled_width, scaled_height) {
        return image;
    }

    let x = ((scaled_width - crop_width) as f64 * crop.x).round() as u32;
    let y = ((scaled_height - crop_height) as f64 * crop.y).round() as u32;
    image.crop_imm(x, y, crop_width, crop_height)
}

/// Returns the cached thumbnail for a post image, creating it first if needed.
/// Blocking; run it off the async runtime.
pub fn get_or_create(
    store: &Store,
    post_id: &PostID,
    image_name: &str,
    options: &ThumbnailOptions,
) -> Result<Thumbnail, ThumbnailError> {
    if !is_valid_image_name(image_name) {
        return Err(ThumbnailError::ImageName(image_name.to_owned()));
    }

    let geometry = options.geometry.to_string();
    let thumb_path = store.thumb_path(post_id, &geometry, image_name);

    let (width, height) = match image::image_dimensions(&thumb_path) {
        Ok(it) => it,
        Err(_) => {
            let raw_path = store.image_path(post_id, image_name);
            let reader = image::io::Reader::open(&raw_path)?.with_guessed_format()?;
            let (raw_width, raw_height) = image::image_dimensions(&raw_path)?;
            options.bounded_size(raw_width, raw_height)?;

            let image = reader.decode()?;
            let thumb = create_thumb_static(image, options);

            if let Some(parent) = thumb_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            thumb.save(&thumb_path)?;
            tracing::debug!(%post_id, image_name, %geometry, "created thumbnail");

            (thumb.width(), thumb.height())
        }
    };

    Ok(Thumbnail {
        url: crate::page::urls::post_image_thumb(post_id, image_name, &geometry),
        width,
        height,
    })
}

pub fn is_valid_image_name(image_name: &str) -> bool {
    let path = std::path::Path::new(image_name);
    !image_name.is_empty()
        && image_name.len() <= 100
        && path.file_name().and_then(|name| name.to_str()) == Some(image_name)
}
