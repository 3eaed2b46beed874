//! NDVI map overlay URL for the timeline view.
//!
//! The map client fetches WMS tiles directly; the backend only assembles
//! the yearly GetMap URL template. The `BBOX` placeholder is substituted
//! per tile by the map library and is emitted verbatim.

use crate::config::OverlayConfig;
use crate::remote::RemoteError;

/// Build the yearly NDVI WMS tile URL template.
///
/// The `TIME` window spans the whole requested year. Returns a
/// configuration error when no WMS instance id is set; callers are
/// expected to disable the overlay layer in that case.
pub fn wms_overlay_url(config: &OverlayConfig, year: i32) -> Result<String, RemoteError> {
    let instance = config.instance_id.as_deref().ok_or_else(|| {
        RemoteError::Configuration(
            "WMS instance id is not configured, NDVI overlay disabled".to_string(),
        )
    })?;

    let time_from = format!("{year}-01-01T00:00:00Z");
    let time_to = format!("{year}-12-31T23:59:59Z");

    Ok(format!(
        "{}/{}?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap&FORMAT=image/png\
         &TRANSPARENT=true&LAYERS=NDVI&CRS=EPSG:3857&TIME={}/{}\
         &WIDTH=256&HEIGHT=256&BBOX={{bbox-epsg-3857}}",
        config.base_url, instance, time_from, time_to
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wms_overlay_url_layout() {
        let config = OverlayConfig {
            instance_id: Some("abc123".to_string()),
            ..Default::default()
        };

        let url = wms_overlay_url(&config, 2024).unwrap();
        assert_eq!(
            url,
            "https://sh.dataspace.copernicus.eu/ogc/wms/abc123?SERVICE=WMS&VERSION=1.3.0\
             &REQUEST=GetMap&FORMAT=image/png&TRANSPARENT=true&LAYERS=NDVI&CRS=EPSG:3857\
             &TIME=2024-01-01T00:00:00Z/2024-12-31T23:59:59Z&WIDTH=256&HEIGHT=256\
             &BBOX={bbox-epsg-3857}"
        );
    }

    #[test]
    fn test_wms_overlay_url_requires_instance_id() {
        let config = OverlayConfig::default();

        let err = wms_overlay_url(&config, 2024).unwrap_err();
        assert!(matches!(err, RemoteError::Configuration(_)));
    }

    #[test]
    fn test_wms_overlay_url_keeps_bbox_placeholder() {
        let config = OverlayConfig {
            instance_id: Some("abc123".to_string()),
            ..Default::default()
        };

        let url = wms_overlay_url(&config, 2025).unwrap();
        assert!(url.ends_with("&BBOX={bbox-epsg-3857}"));
    }
}
