//! GetDeviceInfo dataset decoding
//!
//! The dataset is a fixed sequence of fields. Parsing is sequential and stops
//! at the first field that does not fit; fields decoded up to that point are
//! kept. Some firmware cuts the dataset short before pairing.

use std::collections::BTreeSet;
use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::{BufMut, BytesMut};
use ptpip_types::DeviceDescriptor;
use tracing::{debug, warn};

use crate::wire;

/// Decode a device info payload
///
/// Never fails: a truncated buffer yields a descriptor with the trailing
/// fields left as `None`.
pub fn parse_device_info(data: &[u8]) -> DeviceDescriptor {
    let mut descriptor = DeviceDescriptor::default();
    let mut reader = Cursor::new(data);

    match read_fields(&mut reader, &mut descriptor) {
        Ok(()) => debug!(len = data.len(), "Device info decoded"),
        Err(e) => warn!(
            offset = reader.position(),
            len = data.len(),
            error = %e,
            "Device info truncated, keeping decoded fields"
        ),
    }

    descriptor
}

fn remaining(reader: &Cursor<&[u8]>) -> usize {
    reader.get_ref().len().saturating_sub(reader.position() as usize)
}

fn read_u16_set(reader: &mut Cursor<&[u8]>) -> io::Result<BTreeSet<u16>> {
    let available = remaining(reader);
    Ok(wire::read_u16_array(reader, available)?.into_iter().collect())
}

fn read_fields(reader: &mut Cursor<&[u8]>, d: &mut DeviceDescriptor) -> io::Result<()> {
    d.standard_version = Some(reader.read_u16::<LittleEndian>()?);
    d.vendor_extension_id = Some(reader.read_u32::<LittleEndian>()?);
    d.vendor_extension_version = Some(reader.read_u16::<LittleEndian>()?);
    d.vendor_description = Some(wire::read_ptp_string(reader)?);
    d.functional_mode = Some(reader.read_u16::<LittleEndian>()?);
    d.operations = Some(read_u16_set(reader)?);
    d.events = Some(read_u16_set(reader)?);
    d.device_properties = Some(read_u16_set(reader)?);
    d.capture_formats = Some(read_u16_set(reader)?);
    d.image_formats = Some(read_u16_set(reader)?);
    d.manufacturer = Some(wire::read_ptp_string(reader)?);
    d.model = Some(wire::read_ptp_string(reader)?);
    d.device_version = Some(wire::read_ptp_string(reader)?);
    d.serial_number = Some(wire::read_ptp_string(reader)?);
    Ok(())
}

/// Encode a descriptor as a device info payload
///
/// Fields are written in dataset order up to the first `None`, so a partially
/// filled descriptor produces the matching truncated dataset.
pub fn encode_device_info(d: &DeviceDescriptor) -> BytesMut {
    let mut buf = BytesMut::new();
    let _ = write_fields(&mut buf, d);
    buf
}

fn write_fields(buf: &mut BytesMut, d: &DeviceDescriptor) -> Option<()> {
    fn put_set(buf: &mut BytesMut, set: &BTreeSet<u16>) {
        wire::put_u16_array(buf, set.iter().copied());
    }

    buf.put_u16_le(d.standard_version?);
    buf.put_u32_le(d.vendor_extension_id?);
    buf.put_u16_le(d.vendor_extension_version?);
    wire::put_ptp_string(buf, d.vendor_description.as_deref()?);
    buf.put_u16_le(d.functional_mode?);
    put_set(buf, d.operations.as_ref()?);
    put_set(buf, d.events.as_ref()?);
    put_set(buf, d.device_properties.as_ref()?);
    put_set(buf, d.capture_formats.as_ref()?);
    put_set(buf, d.image_formats.as_ref()?);
    wire::put_ptp_string(buf, d.manufacturer.as_deref()?);
    wire::put_ptp_string(buf, d.model.as_deref()?);
    wire::put_ptp_string(buf, d.device_version.as_deref()?);
    wire::put_ptp_string(buf, d.serial_number.as_deref()?);
    Some(())
}
