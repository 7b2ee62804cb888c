use crate::error::{ErrorKind, ValidationError};
use crate::pattern::Pattern;
use crate::value::{Object, Value};

/// Recursively validate an already-built [`Value`] tree against a pattern,
/// returning the (possibly coerced) tree.
///
/// Unlike schema-directed parsing, members of a namespace that the pattern
/// does not name pass through untouched; the document may carry more than
/// the schema describes. Everything the schema does name is checked: the
/// mandatory set, relation arity, collection elements, dictionary keys and
/// values, and every scalar's type and range.
///
/// # Errors
///
/// Fails with a path-carrying [`ValidationError`] at the first offending
/// value.
pub fn validate(instance: Value, pattern: &Pattern) -> Result<Value, ValidationError> {
    match pattern {
        Pattern::Array(types) => {
            let instance = pattern.value(instance).map_err(ValidationError::new)?;
            let elements = match instance {
                Value::Null => return Ok(Value::Null),
                Value::Array(elements) => elements,
                _ => return Err(ValidationError::new(ErrorKind::ArrayTypeError)),
            };
            if types.is_empty() {
                return Ok(Value::Array(elements));
            }
            if types.len() > 1 {
                relation(elements, types)
            } else {
                collection(elements, &types[0])
            }
        }
        Pattern::Namespace(namespace) => {
            let instance = pattern.value(instance).map_err(ValidationError::new)?;
            let map = match instance {
                Value::Null => return Ok(Value::Null),
                Value::Object(map) => map,
                _ => return Err(ValidationError::new(ErrorKind::ObjectTypeError)),
            };
            let mut out = Object::with_capacity(map.len());
            for (name, value) in map {
                match namespace.fields.get(&name) {
                    Some(field) => {
                        let value = validate(value, field).map_err(|e| e.in_key(&name))?;
                        out.insert(name, value);
                    }
                    None => {
                        out.insert(name, value);
                    }
                }
            }
            Ok(Value::Object(out))
        }
        Pattern::Dictionary(dictionary) => {
            let instance = pattern.value(instance).map_err(ValidationError::new)?;
            let map = match instance {
                Value::Null => return Ok(Value::Null),
                Value::Object(map) => map,
                _ => return Err(ValidationError::new(ErrorKind::ObjectTypeError)),
            };
            let mut out = Object::with_capacity(map.len());
            for (name, value) in map {
                let key = dictionary
                    .key
                    .value(Value::Str(name.clone()))
                    .map_err(|kind| ValidationError::new(kind).in_key(&name))?;
                let key = match key {
                    Value::Str(s) => s,
                    _ => name.clone(),
                };
                let value =
                    validate(value, &dictionary.value).map_err(|e| e.in_key(&name))?;
                out.insert(key, value);
            }
            Ok(Value::Object(out))
        }
        _ => pattern.value(instance).map_err(ValidationError::new),
    }
}

/// One pattern per position, arity required to match exactly.
fn relation(elements: Vec<Value>, types: &[Pattern]) -> Result<Value, ValidationError> {
    if elements.len() < types.len() {
        return Err(ValidationError::new(ErrorKind::PartialArray));
    }
    if elements.len() > types.len() {
        return Err(ValidationError::new(ErrorKind::ArrayOverflow));
    }
    let mut out = Vec::with_capacity(elements.len());
    for (index, (element, pattern)) in elements.into_iter().zip(types).enumerate() {
        out.push(validate(element, pattern).map_err(|e| e.in_index(index))?);
    }
    Ok(Value::Array(out))
}

/// One pattern for every element.
fn collection(elements: Vec<Value>, pattern: &Pattern) -> Result<Value, ValidationError> {
    let mut out = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        out.push(validate(element, pattern).map_err(|e| e.in_index(index))?);
    }
    Ok(Value::Array(out))
}
