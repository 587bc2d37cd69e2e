//! Icon resolution.
//!
//! Icons travel between disk and the UI as `data:image/<ext>;base64,...`
//! URIs. A missing icon is not an error; a built-in placeholder PNG is used
//! instead.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder icon served when an extension has none of its own.
pub const DEFAULT_ICON_DATA: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAHgAAAB4CAMAAAAOusbgAAAABGdBTUEAALGPC/xhBQAAACBjSFJNAAB6JgAAgIQAAPoAAACA6AAAdTAAAOpgAAA6mAAAF3CculE8AAAATlBMVEUAAADx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLx8vLe39/o6enj5OTY2dnl5uba29vr7Ozv8PD///+VH9SVAAAAEHRSTlMAQHCAv+8gYJ/fz1CPMBCv0SKY+gAAAAFiS0dEGexutYgAAAAHdElNRQfiCwYULSNcgV7VAAACjElEQVRo3u2b247iMAyGU1L3EEJxmWFm3/9J92IX1KKmcWo7Hmn4LxHSp1SxHZ+cK1Vz8m0L+BS0rT81TlVdP4yYUBj6Tod6jknoQ2M8S1MvEZAkiBc56tQHLFDoJxmsBywU+MkCK4I+hv2HZmCbERkajxr3dEWmroe+9xmQLSi36ymiiGLhobuAQgpFjrQBFBMU3LEeRdWTjReFRTTpAcU1GHFJZBUugexRSb7qfSbf7QYVtWPPHWiCIenDpoCqCim/HVFZMREHUV2bUXICfTBsfewrVtC1siXt2VTqXTendEPEj3lHH5svQLKr/Ezpjojz545miutM3yxp8Mv9SscGafD6yDumJA5eHXknGIqDl0fe8x3y4MWR96KwPHgRmQMbvLTfrxw4POsMyAavXE4OjBdKONQAP8Ij1AYDJQ5rgP/H5UgGz6QARADH3bikCB6dc67D+mDs8m94HXCfT5Zewd/J21YCHjJuSw0cnHNoAcb8I08J3LiTKJh8FU/ZhFgJ7F1rA27twGADhpw1aYHxDWaCs0mbFpiuN5gJvi90e5vTGmzmMn9fdDJ7CJg9fRobcFP8vP3znVIROJuzFaYw1H+H8hRG5t+DdNJG/XdflqZ+bVVwb8sfqOCuLDHfLEfci+tcj+JxrA+OnOILB3zmlJsYYGAV2BjgyCopMsAXVhH1ODjwysbHwT2vUH4YvOwN+Jpgz2yGHAWv+z++HthXb6VuN1R9LbCnNjWFNf6cNq5Z49quVW82nGA3jmE3gGI2cmM3ZGQ3VmU3SGY3Omc3LGg3Hmk3EGo3Ams39Gs35mw32G03ym44vG+3rmC4oGG4kmK3hGO4dmS4aGW5WvZcpkt+dL1lOuH1wb8Dn/C3GCuwnwAAACV0RVh0ZGF0ZTpjcmVhdGUAMjAxOC0xMS0wNlQyMDo0NTozNSswMDowMEkH/xoAAAAldEVYdGRhdGU6bW9kaWZ5ADIwMTgtMTEtMDZUMjA6NDU6MzUrMDA6MDA4WkemAAAAGXRFWHRTb2Z0d2FyZQBBZG9iZSBJbWFnZVJlYWR5ccllPAAAAABJRU5ErkJggg==";

static DATA_URI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(\w+);base64,(.*)$").expect("valid data uri pattern")
});

/// An icon payload decoded out of a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIcon {
    /// File extension taken from the MIME subtype, e.g. `png`.
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl DecodedIcon {
    /// File name the payload materializes to inside an extension directory.
    pub fn file_name(&self) -> String {
        format!("icon.{}", self.extension)
    }
}

/// Encode the icon file at `path` as a data URI, with the MIME subtype taken
/// from the file extension. A missing or unreadable file resolves to the
/// built-in default icon; this never fails.
pub fn resolve(path: &Path) -> String {
    let Ok(bytes) = fs::read(path) else {
        return DEFAULT_ICON_DATA.to_string();
    };
    let subtype = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    format!("data:image/{subtype};base64,{}", BASE64.encode(bytes))
}

/// Decode a `data:image/<ext>;base64,<data>` URI back into bytes. Returns
/// `None` when the input does not match the pattern or the payload is not
/// valid base64.
pub fn decode(data_uri: &str) -> Option<DecodedIcon> {
    let caps = DATA_URI_PATTERN.captures(data_uri)?;
    let bytes = BASE64.decode(&caps[2]).ok()?;
    Some(DecodedIcon {
        extension: caps[1].to_string(),
        bytes,
    })
}
