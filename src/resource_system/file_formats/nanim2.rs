// ASCII animation format, one keyword per line:
//
//   type nanim2
//   numgroups <n>
//   numkeys <n>
//   group <numCurves> <startKey> <numKeys> <keyStride> <keyTime> <fadeInFrames> <clamp|repeat>
//   curve <ipol> <firstKeyIndex> <isAnimated> <x> <y> <z> <w>
//   key <x> <y> <z> <w>

use std::{fmt::Write as _, io::BufRead, path::Path, str::FromStr};

use glam::Vec4;

use crate::{
    error::{AnimError, Result},
    resource_system::animation::{AnimationAsset, AnimationGroup, Curve, Interpolation, LoopType},
};

use super::MAX_PREALLOC;

struct Tokens<'a> {
    line: usize,
    iter: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next_str(&mut self, what: &str) -> Result<&'a str> {
        self.iter.next().ok_or_else(|| parse_error(self.line, format!("missing {what}")))
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_str(what)?;
        token
            .parse()
            .map_err(|_| parse_error(self.line, format!("invalid {what} '{token}'")))
    }

    fn next_vec4(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(self.next("x")?, self.next("y")?, self.next("z")?, self.next("w")?))
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> AnimError {
    AnimError::Parse { line, message: message.into() }
}

pub fn parse(name: &str, reader: impl BufRead) -> Result<AnimationAsset> {
    let mut declared_groups = None;
    let mut declared_keys = 0usize;
    let mut groups: Vec<(usize, AnimationGroup)> = Vec::new();
    let mut keys = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = Tokens { line: line_no, iter: line.split_whitespace() };
        let Some(keyword) = tokens.iter.next() else {
            continue;
        };

        match keyword {
            "type" => {
                let kind = tokens.next_str("type")?;
                if kind != "nanim2" {
                    return Err(parse_error(line_no, format!("invalid type '{kind}', must be 'nanim2'")));
                }
            }
            "numgroups" => {
                let count: usize = tokens.next("group count")?;
                if count == 0 {
                    return Err(parse_error(line_no, "file has no groups"));
                }
                groups.reserve(count.min(MAX_PREALLOC));
                declared_groups = Some(count);
            }
            "numkeys" => {
                declared_keys = tokens.next("key count")?;
                keys.reserve(declared_keys.min(MAX_PREALLOC));
            }
            "group" => {
                if groups.len() >= declared_groups.unwrap_or(0) {
                    return Err(parse_error(line_no, "more groups than declared by numgroups"));
                }
                let num_curves: usize = tokens.next("curve count")?;
                let group = AnimationGroup {
                    curves: Vec::with_capacity(num_curves.min(MAX_PREALLOC)),
                    start_key: tokens.next("start key")?,
                    num_keys: tokens.next("key count")?,
                    key_stride: tokens.next("key stride")?,
                    key_time: tokens.next("key time")?,
                    fade_in_frames: tokens.next("fade in frames")?,
                    loop_type: LoopType::from_keyword(tokens.next_str("loop type")?),
                };
                groups.push((num_curves, group));
            }
            "curve" => {
                let interpolation = Interpolation::from_keyword(tokens.next_str("interpolation")?);
                let first_key_index: i64 = tokens.next("first key index")?;
                let is_animated: i32 = tokens.next("animated flag")?;
                let value = tokens.next_vec4()?;
                let Some((num_curves, group)) = groups.last_mut() else {
                    return Err(parse_error(line_no, "curve outside of a group"));
                };
                if group.curves.len() >= *num_curves {
                    return Err(parse_error(line_no, "more curves than declared by the group"));
                }
                let curve = match usize::try_from(first_key_index) {
                    Ok(first) => Curve::new(interpolation, first, is_animated != 0).with_const_value(value),
                    Err(_) => {
                        let mut curve = Curve::collapsed(interpolation, value);
                        curve.set_animated(is_animated != 0);
                        curve
                    }
                };
                group.curves.push(curve);
            }
            "key" => {
                if keys.len() >= declared_keys {
                    return Err(parse_error(line_no, "more keys than declared by numkeys"));
                }
                keys.push(tokens.next_vec4()?);
            }
            other => return Err(parse_error(line_no, format!("unknown keyword '{other}'"))),
        }
    }

    let Some(declared_groups) = declared_groups else {
        return Err(parse_error(0, "file has no groups"));
    };
    if groups.len() != declared_groups || keys.len() != declared_keys {
        return Err(parse_error(0, format!(
            "expected {declared_groups} groups and {declared_keys} keys, found {} and {}",
            groups.len(),
            keys.len()
        )));
    }
    let mut out = Vec::with_capacity(groups.len());
    for (group_index, (num_curves, group)) in groups.into_iter().enumerate() {
        if group.curves.len() != num_curves {
            return Err(parse_error(0, format!(
                "group {group_index} declares {num_curves} curves but has {}",
                group.curves.len()
            )));
        }
        out.push(group);
    }
    AnimationAsset::new(name, out, keys)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<AnimationAsset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    parse(&path.to_string_lossy(), std::io::BufReader::new(file))
}

pub fn to_string(asset: &AnimationAsset) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "type nanim2");
    let _ = writeln!(out, "numgroups {}", asset.groups().len());
    let _ = writeln!(out, "numkeys {}", asset.keys().len());
    for group in asset.groups() {
        let _ = writeln!(
            out,
            "group {} {} {} {} {} {} {}",
            group.num_curves(),
            group.start_key,
            group.num_keys,
            group.key_stride,
            group.key_time,
            group.fade_in_frames,
            group.loop_type.keyword()
        );
        for curve in &group.curves {
            let v = curve.const_value();
            let first = curve.first_key_index().map_or(-1, |i| i as i64);
            let _ = writeln!(
                out,
                "curve {} {} {} {} {} {} {}",
                curve.interpolation().keyword(),
                first,
                curve.is_animated() as i32,
                v.x,
                v.y,
                v.z,
                v.w
            );
        }
    }
    for key in asset.keys() {
        let _ = writeln!(out, "key {} {} {} {}", key.x, key.y, key.z, key.w);
    }
    out
}

pub fn save<P: AsRef<Path>>(asset: &AnimationAsset, path: P) -> Result<()> {
    std::fs::write(path, to_string(asset))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: &str = "\
type nanim2
numgroups 1
numkeys 2

group 2 0 2 1 0.5 0 repeat
curve linear 0 1 0 0 0 0
curve quat -1 0 0 0 0 1
key 0 0 0 0
key 1 2 3 0
";

    #[test]
    fn parses_groups_curves_and_keys() {
        let asset = parse("walk", WALK.as_bytes()).unwrap();
        let group = &asset.groups()[0];
        assert_eq!(group.num_curves(), 2);
        assert_eq!(group.loop_type, LoopType::Repeat);
        assert_eq!(group.key_time, 0.5);
        assert!(group.curves[1].is_collapsed());
        assert_eq!(group.curves[1].interpolation(), Interpolation::Quat);
        assert_eq!(group.curves[1].const_value(), Vec4::W);
        assert_eq!(asset.keys()[1], Vec4::new(1.0, 2.0, 3.0, 0.0));
    }

    #[test]
    fn written_text_parses_back() {
        let asset = parse("walk", WALK.as_bytes()).unwrap();
        let again = parse("walk", to_string(&asset).as_bytes()).unwrap();
        assert_eq!(asset, again);
    }

    #[test]
    fn reports_the_offending_line() {
        let text = WALK.replace("key 1 2 3 0", "frame 1 2 3 0");
        match parse("walk", text.as_bytes()) {
            Err(AnimError::Parse { line, message }) => {
                assert_eq!(line, 9);
                assert!(message.contains("frame"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn absurd_counts_fail_without_allocating() {
        let huge_keys = WALK.replace("numkeys 2", "numkeys 18446744073709551615");
        assert!(matches!(parse("walk", huge_keys.as_bytes()), Err(AnimError::Parse { line: 0, .. })));

        let huge_group = WALK.replace("group 2 0 2 1 0.5 0 repeat", "group 2 0 4294967297 4294967297 0.5 0 repeat");
        assert!(matches!(
            parse("walk", huge_group.as_bytes()),
            Err(AnimError::KeyRangeOutOfBounds { group: 0, curve: 0 })
        ));
    }

    #[test]
    fn rejects_wrong_type_and_empty_files() {
        let wrong = WALK.replace("type nanim2", "type nanim3");
        assert!(matches!(parse("walk", wrong.as_bytes()), Err(AnimError::Parse { line: 1, .. })));
        let no_groups = "type nanim2\nnumgroups 0\n";
        assert!(matches!(parse("walk", no_groups.as_bytes()), Err(AnimError::Parse { line: 2, .. })));
    }
}
