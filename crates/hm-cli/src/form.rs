//! Text-entry form for adding and editing people.

use std::str::FromStr;

use chrono::NaiveDate;
use hm_core::person::{Gender, Person, PersonFields, PersonId};
use strum::{Display, EnumIter, IntoEnumIterator};

// ─── Fields ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Field {
  Name,
  Nickname,
  Gender,
  Birthday,
  Resources,
  Needs,
  Phone,
  Email,
  City,
}

impl Field {
  pub fn hint(self) -> &'static str {
    match self {
      Self::Name => "required",
      Self::Gender => "male / female / other",
      Self::Birthday => "YYYY-MM-DD",
      _ => "",
    }
  }
}

/// What submitting the form does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purpose {
  Create,
  Edit(PersonId),
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PersonForm {
  pub purpose: Purpose,
  pub rows:    Vec<(Field, String)>,
  pub focus:   usize,
  /// Last submission error, shown under the fields.
  pub error:   Option<String>,
}

impl PersonForm {
  /// The short add-person form: name and nickname only.
  pub fn create() -> Self {
    Self {
      purpose: Purpose::Create,
      rows:    vec![(Field::Name, String::new()), (Field::Nickname, String::new())],
      focus:   0,
      error:   None,
    }
  }

  /// Every field, prefilled from `person`.
  pub fn edit(person: &Person) -> Self {
    let f = &person.fields;
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let rows = Field::iter()
      .map(|field| {
        let value = match field {
          Field::Name => f.name.clone(),
          Field::Nickname => text(&f.nickname),
          Field::Gender => f.gender.map(|g| g.to_string()).unwrap_or_default(),
          Field::Birthday => f.birthday.map(|d| d.to_string()).unwrap_or_default(),
          Field::Resources => text(&f.resources),
          Field::Needs => text(&f.needs),
          Field::Phone => text(&f.phone),
          Field::Email => text(&f.email),
          Field::City => text(&f.city),
        };
        (field, value)
      })
      .collect();
    Self {
      purpose: Purpose::Edit(person.id.clone()),
      rows,
      focus: 0,
      error: None,
    }
  }

  pub fn title(&self) -> &'static str {
    match self.purpose {
      Purpose::Create => " Add person ",
      Purpose::Edit(_) => " Edit person ",
    }
  }

  // ── Editing ───────────────────────────────────────────────────────────────

  pub fn next(&mut self) { self.focus = (self.focus + 1) % self.rows.len(); }

  pub fn prev(&mut self) { self.focus = (self.focus + self.rows.len() - 1) % self.rows.len(); }

  pub fn push(&mut self, c: char) {
    if let Some((_, value)) = self.rows.get_mut(self.focus) {
      value.push(c);
    }
  }

  pub fn pop(&mut self) {
    if let Some((_, value)) = self.rows.get_mut(self.focus) {
      value.pop();
    }
  }

  // ── Submission ────────────────────────────────────────────────────────────

  /// Parse the entered text. Blank optional fields become `None`.
  pub fn fields(&self) -> Result<PersonFields, String> {
    let mut out = PersonFields::default();
    for (field, raw) in &self.rows {
      let value = raw.trim();
      let opt = (!value.is_empty()).then(|| value.to_owned());
      match field {
        Field::Name => out.name = value.to_owned(),
        Field::Nickname => out.nickname = opt,
        Field::Gender => {
          out.gender = opt
            .map(|g| Gender::from_str(&g).map_err(|_| format!("unknown gender {g:?}")))
            .transpose()?;
        }
        Field::Birthday => {
          out.birthday = opt
            .map(|d| {
              NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| format!("birthday {d:?} is not YYYY-MM-DD"))
            })
            .transpose()?;
        }
        Field::Resources => out.resources = opt,
        Field::Needs => out.needs = opt,
        Field::Phone => out.phone = opt,
        Field::Email => out.email = opt,
        Field::City => out.city = opt,
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn typed(form: &mut PersonForm, text: &str) {
    text.chars().for_each(|c| form.push(c));
  }

  #[test]
  fn create_form_has_name_and_nickname() {
    let mut form = PersonForm::create();
    typed(&mut form, "Ada");
    form.next();
    typed(&mut form, " ");
    let fields = form.fields().unwrap();
    assert_eq!(fields.name, "Ada");
    assert_eq!(fields.nickname, None);
    form.next();
    assert_eq!(form.focus, 0);
  }

  #[test]
  fn edit_form_round_trips_a_person() {
    let mut fields = PersonFields::named("Grace", Some("amazing".into()));
    fields.gender = Some(Gender::Female);
    fields.birthday = NaiveDate::from_ymd_opt(1906, 12, 9);
    fields.city = Some("Arlington".into());
    let person = Person {
      id: PersonId::new("p1"),
      fields: fields.clone(),
      created_at: Utc::now(),
      updated_at: None,
    };
    let form = PersonForm::edit(&person);
    assert_eq!(form.purpose, Purpose::Edit(PersonId::new("p1")));
    assert_eq!(form.fields().unwrap(), fields);
  }

  #[test]
  fn bad_values_are_reported() {
    let person = Person {
      id: PersonId::new("p1"),
      fields: PersonFields::named("Grace", None),
      created_at: Utc::now(),
      updated_at: None,
    };
    let mut form = PersonForm::edit(&person);
    form.focus = 3;
    typed(&mut form, "someday");
    assert!(form.fields().unwrap_err().contains("YYYY-MM-DD"));

    form.pop();
    form.rows[3].1.clear();
    form.prev();
    typed(&mut form, "robot");
    assert!(form.fields().unwrap_err().contains("gender"));
  }
}
