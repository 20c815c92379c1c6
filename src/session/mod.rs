use serde::{Deserialize, Serialize, Serializer};

pub mod store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentType {
    Question,
    Image,
    Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: u32,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FragmentType,
}

/// Classification metadata sent alongside the fragments.
///
/// Fields that have never been confirmed serialize as `""`. Once confirmed,
/// `materia` is the subject list, `assunto`/`subAssunto` are one-element
/// lists and `faculdade`/`ano` stay bare strings. The endpoint expects this
/// exact shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    #[serde(serialize_with = "list_or_blank")]
    pub materia: Option<Vec<String>>,
    #[serde(serialize_with = "list_or_blank")]
    pub assunto: Option<Vec<String>>,
    #[serde(rename = "subAssunto", serialize_with = "list_or_blank")]
    pub sub_assunto: Option<Vec<String>>,
    pub faculdade: String,
    pub ano: String,
}

impl Filter {
    pub fn confirmed(
        subjects: Vec<String>,
        assunto: &str,
        sub_assunto: &str,
        faculdade: &str,
        ano: &str,
    ) -> Self {
        Self {
            materia: Some(subjects),
            assunto: Some(vec![assunto.to_string()]),
            sub_assunto: Some(vec![sub_assunto.to_string()]),
            faculdade: faculdade.to_string(),
            ano: ano.to_string(),
        }
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

fn list_or_blank<S>(value: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(items) => items.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionRecord {
    data: Vec<Fragment>,
    filter: Filter,
    #[serde(skip)]
    next_id: u32,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.data
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    #[cfg(test)]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends a fragment under the next id and returns that id.
    pub fn append(&mut self, value: impl Into<String>, kind: FragmentType) -> u32 {
        let id = self.next_id;
        self.data.push(Fragment {
            id,
            value: value.into(),
            kind,
        });
        self.next_id += 1;
        id
    }

    /// Re-tags the first fragment with `id` as a point. Unknown ids are ignored;
    /// the return value only reports whether anything matched.
    pub fn mark_as_point(&mut self, id: u32) -> bool {
        match self.data.iter_mut().find(|fragment| fragment.id == id) {
            Some(fragment) => {
                fragment.kind = FragmentType::Point;
                true
            }
            None => false,
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
