use quote::ToTokens;
use syn::{Attribute, Field, FieldsNamed, Token, punctuated::Punctuated};

// 提取非 derive 属性与已有 derive 列表
pub(crate) fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.iter() {
        if attr.path().is_ident("derive") {
            if let Ok(list) = attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, Token![,]>::parse_terminated,
            ) {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize/::serde::Serialize 重复
pub(crate) fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let last_ident = last.ident.to_string();
            match last_ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{}", last_ident),
                _ => last_ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

/// 合并宏要求的 derive 与用户已有的 derive
/// - required 优先并去重；
/// - excluded 中的 derive 会从用户列表中剔除（由宏手写实现，避免冲突）。
pub(crate) fn apply_derives(
    attrs: &mut Vec<Attribute>,
    required: Vec<syn::Path>,
    excluded: &[&str],
) {
    let (retained, existing) = split_derives(attrs);

    let mut seen = std::collections::HashSet::<String>::new();
    let mut final_list: Vec<syn::Path> = Vec::new();
    for p in required.into_iter().chain(existing) {
        let key = derive_key(&p);
        if excluded.contains(&key.as_str()) {
            continue;
        }
        if seen.insert(key) {
            final_list.push(p);
        }
    }

    let merged: Attribute = syn::parse_quote!(#[derive(#(#final_list),*)]);
    *attrs = std::iter::once(merged).chain(retained).collect();
}

fn field_is(field: &Field, name: &str) -> bool {
    field.ident.as_ref().map(|i| i == name).unwrap_or(false)
}

/// 确保具名字段结构体包含所需字段，并把它们按给定顺序放到最前
/// - 已存在的同名字段沿用用户定义（类型与属性不变）；
/// - 其余字段保持原始相对顺序。
pub(crate) fn ensure_leading_fields(fields_named: &mut FieldsNamed, required: Vec<Field>) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    let required_names: Vec<String> = required
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
        .collect();

    for field in required {
        let name = field.ident.as_ref().map(|i| i.to_string()).unwrap_or_default();
        match old_named.iter().find(|f| field_is(f, &name)) {
            Some(existing) => new_named.push(existing.clone()),
            None => new_named.push(field),
        }
    }

    for f in old_named.into_iter() {
        if !required_names.iter().any(|n| field_is(&f, n)) {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}

/// `NameChanged` -> `NAME_CHANGED`
pub(crate) fn screaming_snake(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in ident.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_uppercase());
            prev_lower_or_digit = false;
        } else {
            out.extend(ch.to_uppercase());
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
