//! EWKB encoding for the derived point column
//!
//! EWKB is PostGIS-style WKB: the SRID is embedded after the byte order and
//! geometry type, flagged with 0x20000000.
//!
//! Format: [byte_order][type|0x20000000][srid][x][y]
//!
//! Only 2D points are produced here; the importer derives exactly one point
//! per record from the paired coordinate fields.

const EWKB_SRID_FLAG: u32 = 0x2000_0000;

const WKB_POINT: u32 = 1;

/// Spatial reference identifier of the WGS84 geographic CRS
pub const SRID_WGS84: i32 = 4326;

/// Error type for EWKB decoding
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid byte order marker: {0:#04x}")]
    InvalidByteOrder(u8),
    #[error("not an EWKB point")]
    NotAPoint,
    #[error("insufficient bytes for an EWKB point")]
    InsufficientBytes,
}

/// A 2D point in the WGS84 coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointWgs84 {
    pub lon: f64,
    pub lat: f64,
}

impl PointWgs84 {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Encode as little-endian EWKB with SRID 4326.
    pub fn to_ewkb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(25);
        out.push(0x01);
        out.extend_from_slice(&(WKB_POINT | EWKB_SRID_FLAG).to_le_bytes());
        out.extend_from_slice(&SRID_WGS84.to_le_bytes());
        out.extend_from_slice(&self.lon.to_le_bytes());
        out.extend_from_slice(&self.lat.to_le_bytes());
        out
    }

    /// Decode an EWKB point, accepting either byte order.
    ///
    /// Returns the point and the embedded SRID (0 when no SRID flag is set).
    pub fn from_ewkb(bytes: &[u8]) -> Result<(Self, i32), GeometryError> {
        if bytes.len() < 5 {
            return Err(GeometryError::InsufficientBytes);
        }
        let little_endian = match bytes[0] {
            0x01 => true,
            0x00 => false,
            other => return Err(GeometryError::InvalidByteOrder(other)),
        };

        let type_with_flags = read_u32(bytes, 1, little_endian)?;
        if type_with_flags & !EWKB_SRID_FLAG != WKB_POINT {
            return Err(GeometryError::NotAPoint);
        }

        let mut offset = 5;
        let srid = if type_with_flags & EWKB_SRID_FLAG != 0 {
            let srid = read_u32(bytes, offset, little_endian)? as i32;
            offset += 4;
            srid
        } else {
            0
        };

        let lon = read_f64(bytes, offset, little_endian)?;
        let lat = read_f64(bytes, offset + 8, little_endian)?;
        Ok((Self { lon, lat }, srid))
    }
}

fn read_u32(bytes: &[u8], offset: usize, little_endian: bool) -> Result<u32, GeometryError> {
    let raw: [u8; 4] = bytes
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(GeometryError::InsufficientBytes)?;
    Ok(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

fn read_f64(bytes: &[u8], offset: usize, little_endian: bool) -> Result<f64, GeometryError> {
    let raw: [u8; 8] = bytes
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or(GeometryError::InsufficientBytes)?;
    Ok(if little_endian {
        f64::from_le_bytes(raw)
    } else {
        f64::from_be_bytes(raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let point = PointWgs84::new(37.62, 55.75);
        let ewkb = point.to_ewkb();
        assert_eq!(ewkb.len(), 25);

        let (decoded, srid) = PointWgs84::from_ewkb(&ewkb).unwrap();
        assert_eq!(decoded, point);
        assert_eq!(srid, SRID_WGS84);
    }

    #[test]
    fn test_srid_flag_is_set() {
        let ewkb = PointWgs84::new(0.0, 0.0).to_ewkb();
        let type_with_flags = u32::from_le_bytes(ewkb[1..5].try_into().unwrap());
        assert_eq!(type_with_flags & EWKB_SRID_FLAG, EWKB_SRID_FLAG);
        assert_eq!(type_with_flags & !EWKB_SRID_FLAG, WKB_POINT);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(
            PointWgs84::from_ewkb(&[0x02, 0, 0, 0, 0]),
            Err(GeometryError::InvalidByteOrder(0x02))
        );
        assert_eq!(
            PointWgs84::from_ewkb(&[0x01, 0x02]),
            Err(GeometryError::InsufficientBytes)
        );

        // LineString type is not a point
        let mut linestring = vec![0x01];
        linestring.extend_from_slice(&2u32.to_le_bytes());
        assert_eq!(
            PointWgs84::from_ewkb(&linestring),
            Err(GeometryError::NotAPoint)
        );
    }
}
