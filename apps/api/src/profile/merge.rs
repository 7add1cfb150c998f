use crate::profile::models::{clamp_years, PartialProfile, Profile};

/// Applies a CV extraction result to the in-progress profile.
///
/// Supplied fields overwrite, absent fields are left alone. `skills` is the
/// exception: it is replaced only when the extraction returned a non-empty list.
/// Preference fields are never touched by extraction.
pub fn merge_partial(profile: &mut Profile, partial: PartialProfile) {
    let PartialProfile {
        name,
        current_role,
        years_experience,
        target_role,
        skills,
        bio,
    } = partial;

    if let Some(name) = name {
        profile.name = name;
    }
    if let Some(current_role) = current_role {
        profile.current_role = current_role;
    }
    if let Some(years) = years_experience {
        profile.years_experience = clamp_years(years);
    }
    if let Some(target_role) = target_role {
        profile.target_role = target_role;
    }
    if let Some(skills) = skills.filter(|s| !s.is_empty()) {
        profile.skills = skills;
    }
    if let Some(bio) = bio {
        profile.bio = bio;
    }
}
