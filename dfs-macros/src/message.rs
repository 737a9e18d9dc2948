use crate::utils::{apply_derives, screaming_snake};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Ident, Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Event,
    Command,
}

impl MessageKind {
    fn attr_name(self) -> &'static str {
        match self {
            MessageKind::Event => "event",
            MessageKind::Command => "command",
        }
    }

    fn type_key(self) -> &'static str {
        match self {
            MessageKind::Event => "event_type",
            MessageKind::Command => "command_type",
        }
    }
}

// 每个变体（或整个结构体）最终确定的类型名与版本
struct Resolved {
    pattern: TokenStream2,
    const_ident: Ident,
    type_lit: syn::LitStr,
    version: syn::LitInt,
}

/// #[event] / #[command] 宏实现
/// - 枚举：每个变体的类型名默认为 `EnumName.Variant`，并生成同名常量（`EnumName::VARIANT`）
///   供注册处理器使用；变体形态不限（单元/元组/具名）
///   常量名与某个变体同名（如全大写的 `OK`、`V2`）或两个变体映射到同一常量名时报错
/// - 结构体：类型名为结构体名，生成常量 `NAME`
/// - 变体可覆写：`#[event(event_type = "...", event_version = N)]`、`#[command(command_type = "...")]`
/// - `#[event(version = N)]` 指定默认事件版本（默认 1）
/// - 事件派生 Debug/Clone/PartialEq，命令派生 Debug
pub(crate) fn expand(attr: TokenStream, item: TokenStream, kind: MessageKind) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    if kind == MessageKind::Command && cfg.version.is_some() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[command] does not take a version",
        )
        .to_compile_error()
        .into();
    }
    let default_version = cfg.version.unwrap_or_else(|| syn::parse_quote! { 1 });

    let required: Vec<syn::Path> = match kind {
        MessageKind::Event => vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(PartialEq),
        ],
        MessageKind::Command => vec![syn::parse_quote!(Debug)],
    };

    let (ident, vis, generics, resolved) = match &mut input {
        Item::Enum(e) => {
            if e.variants.is_empty() {
                return syn::Error::new(e.span(), "expected at least one variant")
                    .to_compile_error()
                    .into();
            }
            apply_derives(&mut e.attrs, required, &[]);

            let enum_name = e.ident.to_string();
            let variant_idents: Vec<Ident> = e.variants.iter().map(|v| v.ident.clone()).collect();
            let const_idents = match const_idents(&variant_idents) {
                Ok(idents) => idents,
                Err(err) => return err.to_compile_error().into(),
            };
            let mut resolved = Vec::with_capacity(e.variants.len());
            for (v, const_ident) in e.variants.iter_mut().zip(const_idents) {
                let mut retained_attrs = Vec::new();
                let mut override_cfg = VariantOverride::default();
                for attr in v.attrs.iter() {
                    if attr.path().is_ident(kind.attr_name()) {
                        if let Err(err) = override_cfg.merge(attr, kind) {
                            return err.to_compile_error().into();
                        }
                    } else {
                        retained_attrs.push(attr.clone());
                    }
                }
                v.attrs = retained_attrs;

                let v_ident = &v.ident;
                let type_lit = override_cfg.ty.unwrap_or_else(|| {
                    syn::LitStr::new(&format!("{}.{}", enum_name, v_ident), v_ident.span())
                });
                resolved.push(Resolved {
                    pattern: quote! { Self::#v_ident { .. } },
                    const_ident,
                    type_lit,
                    version: override_cfg
                        .version
                        .unwrap_or_else(|| default_version.clone()),
                });
            }
            (e.ident.clone(), e.vis.clone(), e.generics.clone(), resolved)
        }
        Item::Struct(s) => {
            apply_derives(&mut s.attrs, required, &[]);
            let resolved = vec![Resolved {
                pattern: quote! { _ },
                const_ident: format_ident!("NAME"),
                type_lit: syn::LitStr::new(&s.ident.to_string(), s.ident.span()),
                version: default_version.clone(),
            }];
            (s.ident.clone(), s.vis.clone(), s.generics.clone(), resolved)
        }
        other => {
            return syn::Error::new(
                other.span(),
                format!("#[{}] can only be used on enums or structs", kind.attr_name()),
            )
            .to_compile_error()
            .into();
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let consts = resolved.iter().map(|r| {
        let c = &r.const_ident;
        let lit = &r.type_lit;
        quote! { #vis const #c: &'static str = #lit; }
    });
    let type_arms = resolved.iter().map(|r| {
        let pat = &r.pattern;
        let c = &r.const_ident;
        quote! { #pat => Self::#c }
    });

    let trait_impl = match kind {
        MessageKind::Event => {
            let version_arms = resolved.iter().map(|r| {
                let pat = &r.pattern;
                let ver = &r.version;
                quote! { #pat => #ver }
            });
            quote! {
                impl #impl_generics ::dfs_domain::domain_event::DomainEvent for #ident #ty_generics #where_clause {
                    fn event_type(&self) -> &str {
                        match self { #( #type_arms, )* }
                    }

                    fn event_version(&self) -> usize {
                        match self { #( #version_arms, )* }
                    }
                }
            }
        }
        MessageKind::Command => quote! {
            impl #impl_generics ::dfs_application::command::Command for #ident #ty_generics #where_clause {
                fn command_type(&self) -> &str {
                    match self { #( #type_arms, )* }
                }
            }
        },
    };

    let out = quote! {
        #input

        impl #impl_generics #ident #ty_generics #where_clause {
            #( #consts )*
        }

        #trait_impl
    };

    TokenStream::from(out)
}

// 变体对应的常量名；`Self::X` 在常量与变体同名时会解析为变体
fn const_idents(variants: &[Ident]) -> Result<Vec<Ident>> {
    let mut idents: Vec<Ident> = Vec::with_capacity(variants.len());
    for v in variants {
        let name = screaming_snake(&v.to_string());
        if variants.iter().any(|other| other == name.as_str()) {
            return Err(syn::Error::new(
                v.span(),
                format!(
                    "generated constant `{name}` has the same name as a variant; \
                     rename the variant to CamelCase"
                ),
            ));
        }
        if let Some(prev) = variants
            .iter()
            .zip(&idents)
            .find_map(|(prev, c)| (c == name.as_str()).then_some(prev))
        {
            return Err(syn::Error::new(
                v.span(),
                format!("variants `{prev}` and `{v}` both generate constant `{name}`"),
            ));
        }
        idents.push(format_ident!("{}", name, span = v.span()));
    }
    Ok(idents)
}

// -------- parsing --------

// 枚举/结构体级参数：version = N（仅事件）
struct MessageAttrConfig {
    version: Option<syn::LitInt>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut version: Option<syn::LitInt> = None;
        if input.is_empty() {
            return Ok(Self { version });
        }

        let pairs: Punctuated<AttrKv, Token![,]> =
            Punctuated::<AttrKv, Token![,]>::parse_terminated(input)?;
        for kv in pairs {
            match kv.key.to_string().as_str() {
                "version" => {
                    if version.is_some() {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "duplicate key 'version' in attribute",
                        ));
                    }
                    version = Some(int_lit(kv.value, "version")?);
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key; expected 'version'",
                    ));
                }
            }
        }
        Ok(Self { version })
    }
}

#[derive(Default)]
struct VariantOverride {
    ty: Option<syn::LitStr>,
    version: Option<syn::LitInt>,
}

impl VariantOverride {
    fn merge(&mut self, attr: &syn::Attribute, kind: MessageKind) -> Result<()> {
        let pairs: Punctuated<AttrKv, Token![,]> =
            attr.parse_args_with(Punctuated::<AttrKv, Token![,]>::parse_terminated)?;

        for kv in pairs {
            let key = kv.key.to_string();
            if key == kind.type_key() {
                if self.ty.is_some() {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        format!("duplicate '{key}' specified for this variant"),
                    ));
                }
                self.ty = Some(str_lit(kv.value, &key)?);
            } else if key == "event_version" && kind == MessageKind::Event {
                if self.version.is_some() {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "duplicate 'event_version' specified for this variant",
                    ));
                }
                self.version = Some(int_lit(kv.value, &key)?);
            } else {
                let expected = match kind {
                    MessageKind::Event => "unknown key; expected 'event_type' | 'event_version'",
                    MessageKind::Command => "unknown key; expected 'command_type'",
                };
                return Err(syn::Error::new(kv.key.span(), expected));
            }
        }
        Ok(())
    }
}

fn str_lit(value: Expr, key: &str) -> Result<syn::LitStr> {
    match value {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) => Ok(lit),
        other => Err(syn::Error::new(
            other.span(),
            format!("expected string literal for '{key}'"),
        )),
    }
}

fn int_lit(value: Expr, key: &str) -> Result<syn::LitInt> {
    match value {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(lit),
            ..
        }) => Ok(lit),
        other => Err(syn::Error::new(
            other.span(),
            format!("expected integer literal for '{key}'"),
        )),
    }
}

struct AttrKv {
    key: Ident,
    value: Expr,
}

impl Parse for AttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let value: Expr = input.parse()?;
        Ok(Self { key, value })
    }
}
