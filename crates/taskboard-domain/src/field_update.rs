/// Partial update of an optional document field.
///
/// JSON patches distinguish three cases for a nullable property: the key is
/// absent (keep the value), the key is `null` (clear it), or the key carries a
/// value (replace it). Deserializing into `Option<Option<T>>` with
/// `#[serde(default)]` preserves that distinction and converts losslessly:
///
/// ```
/// use taskboard_domain::FieldUpdate;
///
/// let absent: FieldUpdate<String> = None.into();
/// let null: FieldUpdate<String> = Some(None).into();
/// let value: FieldUpdate<String> = Some(Some("Ship it".to_string())).into();
///
/// assert_eq!(absent, FieldUpdate::NoChange);
/// assert_eq!(null, FieldUpdate::Clear);
/// assert_eq!(value, FieldUpdate::Set("Ship it".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Write the update into `field`.
    ///
    /// ```
    /// use taskboard_domain::FieldUpdate;
    ///
    /// let mut cover = Some("old.png".to_string());
    /// FieldUpdate::<String>::NoChange.apply_to(&mut cover);
    /// assert_eq!(cover.as_deref(), Some("old.png"));
    ///
    /// FieldUpdate::Clear.apply_to(&mut cover);
    /// assert_eq!(cover, None);
    /// ```
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    /// Validate or normalize a `Set` value, leaving the other states untouched.
    pub fn try_map<U, E, F>(self, f: F) -> Result<FieldUpdate<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(match self {
            FieldUpdate::NoChange => FieldUpdate::NoChange,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)?),
            FieldUpdate::Clear => FieldUpdate::Clear,
        })
    }
}

impl<T> From<Option<Option<T>>> for FieldUpdate<T> {
    fn from(patch: Option<Option<T>>) -> Self {
        match patch {
            None => FieldUpdate::NoChange,
            Some(None) => FieldUpdate::Clear,
            Some(Some(value)) => FieldUpdate::Set(value),
        }
    }
}
