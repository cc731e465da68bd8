use crate::gateway::{Frame, GatewayError};
use flexgate_core::{
    object::{ClassInfo, Record},
    value::Value,
};

/// Wire name faults travel under.
pub const FAULT_WIRE_NAME: &str = "Fault";

pub static FAULT: ClassInfo = ClassInfo::new("flexgate::gateway::Fault").with_attrs(&[
    "code",
    "description",
    "detail",
    "rootCause",
]);

///
/// Fault
///
/// Structured failure returned in place of a result.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fault {
    pub code: Option<String>,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub root_cause: Option<Vec<Frame>>,
}

impl Fault {
    #[must_use]
    pub fn to_value(&self) -> Value {
        let root_cause = self.root_cause.as_ref().map(|frames| {
            Value::List(
                frames
                    .iter()
                    .map(|frame| {
                        Value::List(vec![
                            Value::from(frame.file.as_str()),
                            Value::from(i64::from(frame.line)),
                            Value::from(frame.function.as_str()),
                            Value::from(frame.source.as_str()),
                        ])
                    })
                    .collect(),
            )
        });

        let record = Record::new(&FAULT)
            .with("code", self.code.clone())
            .with("description", self.description.clone())
            .with("detail", self.detail.clone())
            .with("rootCause", root_cause);

        Value::Object(record.into_ref())
    }

    /// Read a fault back from a decoded object carrying fault attributes.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let is_fault = object.class().path == FAULT.path
            || object.class_name() == Some(FAULT_WIRE_NAME);
        if !is_fault {
            return None;
        }

        let text = |name: &str| {
            object
                .get_attribute(name)
                .and_then(|v| v.as_text().map(str::to_string))
        };
        let root_cause = match object.get_attribute("rootCause") {
            Some(Value::List(frames)) => Some(frames.iter().filter_map(read_frame).collect()),
            _ => None,
        };

        Some(Self {
            code: text("code"),
            description: text("description"),
            detail: text("detail"),
            root_cause,
        })
    }
}

fn read_frame(value: &Value) -> Option<Frame> {
    let [file, line, function, source] = value.as_list()? else {
        return None;
    };

    Some(Frame::new(
        file.as_text()?,
        u32::try_from(line.as_int()?).ok()?,
        function.as_text()?,
        source.as_text()?,
    ))
}

/// Turn a dispatch failure into a `Fault`.
///
/// `detail` is a single line unless `debug` is set, in which case it carries
/// the full formatted trace. `root_cause` always holds the captured frames.
#[must_use]
pub fn build_fault(err: &GatewayError, debug: bool) -> Fault {
    let detail = if debug {
        format_trace(err).join("\n")
    } else {
        format!("{}: {err}", err.kind())
    };

    Fault {
        code: Some(err.code().to_string()),
        description: Some(err.to_string()),
        detail: Some(detail),
        root_cause: Some(err.frames().to_vec()),
    }
}

/// Formatted trace lines of `err`, innermost frame last, with escaped
/// newlines removed.
#[must_use]
pub fn format_trace(err: &GatewayError) -> Vec<String> {
    let mut lines = vec!["Trace (most recent call last):".to_string()];
    lines.extend(err.frames().iter().map(ToString::to_string));
    lines.push(format!("{}: {err}", err.kind()));

    lines
        .into_iter()
        .map(|line| line.replace("\\n", ""))
        .collect()
}
