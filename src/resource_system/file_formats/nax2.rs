use std::{
    io::{Read, Write},
    path::Path,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec4;

use crate::{
    error::{AnimError, Result},
    resource_system::animation::{AnimationAsset, AnimationGroup, Curve, Interpolation, LoopType},
};

use super::MAX_PREALLOC;

/// 'NAX2' stored as a little-endian int
pub const NAX2_MAGIC: u32 = u32::from_be_bytes(*b"NAX2");

fn invalid(message: impl Into<String>) -> AnimError {
    AnimError::InvalidNax2(message.into())
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let value = reader.read_i32::<LittleEndian>()?;
    usize::try_from(value).map_err(|_| invalid(format!("negative {what} {value}")))
}

fn read_vec4<R: Read>(reader: &mut R) -> Result<Vec4> {
    let mut v = [0f32; 4];
    reader.read_f32_into::<LittleEndian>(&mut v)?;
    Ok(Vec4::from_array(v))
}

fn write_vec4<W: Write>(writer: &mut W, v: Vec4) -> Result<()> {
    for c in v.to_array() {
        writer.write_f32::<LittleEndian>(c)?;
    }
    Ok(())
}

/// Layout: header, all group headers, all curves (group by group), then the key pool.
pub fn read<R: Read>(name: &str, reader: &mut R) -> Result<AnimationAsset> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != NAX2_MAGIC {
        return Err(invalid(format!("bad magic {magic:#010x}")));
    }
    let num_groups = read_count(reader, "group count")?;
    if num_groups == 0 {
        return Err(invalid("file has no groups"));
    }
    let num_keys = read_count(reader, "key count")?;

    let mut groups = Vec::with_capacity(num_groups.min(MAX_PREALLOC));
    let mut curve_counts = Vec::with_capacity(num_groups.min(MAX_PREALLOC));
    for _ in 0..num_groups {
        curve_counts.push(read_count(reader, "curve count")?);
        let start_key = reader.read_i32::<LittleEndian>()?;
        let group_keys = read_count(reader, "group key count")?;
        let key_stride = read_count(reader, "key stride")?;
        let key_time = reader.read_f32::<LittleEndian>()?;
        let fade_in_frames = reader.read_f32::<LittleEndian>()?;
        let loop_code = reader.read_i32::<LittleEndian>()?;
        let loop_type = LoopType::from_code(loop_code).ok_or_else(|| invalid(format!("unknown loop type {loop_code}")))?;
        groups.push(AnimationGroup {
            curves: Vec::new(),
            start_key,
            num_keys: group_keys,
            key_stride,
            key_time,
            fade_in_frames,
            loop_type,
        });
    }

    for (group, num_curves) in groups.iter_mut().zip(curve_counts) {
        group.curves.reserve(num_curves.min(MAX_PREALLOC));
        for _ in 0..num_curves {
            let ipol_code = reader.read_i32::<LittleEndian>()?;
            let interpolation = Interpolation::from_code(ipol_code)
                .ok_or_else(|| invalid(format!("unknown interpolation {ipol_code}")))?;
            let first_key_index = reader.read_i32::<LittleEndian>()?;
            let is_animated = reader.read_i32::<LittleEndian>()? != 0;
            let value = read_vec4(reader)?;
            let curve = match usize::try_from(first_key_index) {
                Ok(first) => Curve::new(interpolation, first, is_animated).with_const_value(value),
                Err(_) => {
                    let mut curve = Curve::collapsed(interpolation, value);
                    curve.set_animated(is_animated);
                    curve
                }
            };
            group.curves.push(curve);
        }
    }

    let mut keys = Vec::with_capacity(num_keys.min(MAX_PREALLOC));
    for _ in 0..num_keys {
        keys.push(read_vec4(reader)?);
    }
    AnimationAsset::new(name, groups, keys)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<AnimationAsset> {
    let path = path.as_ref();
    let mut reader = std::io::BufReader::new(std::fs::File::open(path)?);
    read(&path.to_string_lossy(), &mut reader)
}

fn write_count<W: Write>(writer: &mut W, value: usize) -> Result<()> {
    let value = i32::try_from(value).map_err(|_| invalid(format!("count {value} does not fit the format")))?;
    writer.write_i32::<LittleEndian>(value)?;
    Ok(())
}

pub fn write<W: Write>(asset: &AnimationAsset, writer: &mut W) -> Result<()> {
    writer.write_u32::<LittleEndian>(NAX2_MAGIC)?;
    write_count(writer, asset.groups().len())?;
    write_count(writer, asset.keys().len())?;
    for group in asset.groups() {
        write_count(writer, group.num_curves())?;
        writer.write_i32::<LittleEndian>(group.start_key)?;
        write_count(writer, group.num_keys)?;
        write_count(writer, group.key_stride)?;
        writer.write_f32::<LittleEndian>(group.key_time)?;
        writer.write_f32::<LittleEndian>(group.fade_in_frames)?;
        writer.write_i32::<LittleEndian>(group.loop_type as i32)?;
    }
    for group in asset.groups() {
        for curve in &group.curves {
            writer.write_i32::<LittleEndian>(curve.interpolation() as i32)?;
            match curve.first_key_index() {
                Some(first) => write_count(writer, first)?,
                None => writer.write_i32::<LittleEndian>(-1)?,
            }
            writer.write_i32::<LittleEndian>(curve.is_animated() as i32)?;
            write_vec4(writer, curve.const_value())?;
        }
    }
    for key in asset.keys() {
        write_vec4(writer, *key)?;
    }
    Ok(())
}

pub fn save<P: AsRef<Path>>(asset: &AnimationAsset, path: P) -> Result<()> {
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    write(asset, &mut writer)?;
    writer.flush()?;
    Ok(())
}
