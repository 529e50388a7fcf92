use crate::analysis::PatientSubmission;
use crate::error::StoreError;
use crate::store::FieldStore;

/// Placeholder sent for optional fields left blank.
pub const NONE_PLACEHOLDER: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    PatientName,
    Age,
    Symptoms,
    MedicalHistory,
    Allergies,
    CurrentMedications,
}

impl FieldId {
    /// Storage key for the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::PatientName => "patientName",
            FieldId::Age => "age",
            FieldId::Symptoms => "symptoms",
            FieldId::MedicalHistory => "medicalHistory",
            FieldId::Allergies => "allergies",
            FieldId::CurrentMedications => "currentMedications",
        }
    }

    pub fn all() -> [FieldId; 6] {
        [
            FieldId::PatientName,
            FieldId::Age,
            FieldId::Symptoms,
            FieldId::MedicalHistory,
            FieldId::Allergies,
            FieldId::CurrentMedications,
        ]
    }

    /// Label used both on screen and in the composed submission text.
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::PatientName => "Patient Name",
            FieldId::Age => "Age",
            FieldId::Symptoms => "Symptoms",
            FieldId::MedicalHistory => "Medical History",
            FieldId::Allergies => "Allergies",
            FieldId::CurrentMedications => "Current Medications",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldId::PatientName | FieldId::Age | FieldId::Symptoms)
    }

    /// Multi-line inputs (textareas).
    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            FieldId::Symptoms | FieldId::MedicalHistory | FieldId::CurrentMedications
        )
    }

    /// Whether `c` may be typed into this field. Age behaves like a number input.
    pub fn accepts(&self, c: char) -> bool {
        match self {
            FieldId::Age => c.is_ascii_digit(),
            _ => !c.is_control() || (c == '\n' && self.is_multiline()),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Current values of the six intake fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientForm {
    values: [String; 6],
}

impl PatientForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, id: FieldId) -> &str {
        &self.values[id.index()]
    }

    /// Input event: update the field and write it through to the store.
    /// A field edited down to nothing is dropped from the store. The edit is
    /// kept even when the store write fails.
    pub fn set_field<S: FieldStore + ?Sized>(
        &mut self,
        id: FieldId,
        value: impl Into<String>,
        store: &mut S,
    ) -> Result<(), StoreError> {
        let value = value.into();
        let written = if value.is_empty() {
            store.remove(id.as_str())
        } else {
            store.set(id.as_str(), &value)
        };
        self.values[id.index()] = value;
        written
    }

    /// Load stored values into the form. Empty stored values leave the field alone.
    pub fn restore<S: FieldStore + ?Sized>(&mut self, store: &S) {
        for id in FieldId::all() {
            if let Some(saved) = store.get(id.as_str()) {
                if !saved.is_empty() {
                    self.values[id.index()] = saved;
                }
            }
        }
    }

    /// Reset every field to blank and wipe the store.
    pub fn clear<S: FieldStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StoreError> {
        self.values = Default::default();
        store.clear()
    }

    /// First required field that is still empty, in form order.
    pub fn missing_required(&self) -> Option<FieldId> {
        FieldId::all()
            .into_iter()
            .find(|id| id.is_required() && self.value(*id).is_empty())
    }

    pub fn compose(&self) -> PatientSubmission {
        let lines: Vec<String> = FieldId::all()
            .into_iter()
            .map(|id| {
                let value = self.value(id);
                let value = if value.is_empty() && !id.is_required() {
                    NONE_PLACEHOLDER
                } else {
                    value
                };
                format!("{}: {}", id.label(), value)
            })
            .collect();

        PatientSubmission {
            text: lines.join("\n"),
        }
    }
}
