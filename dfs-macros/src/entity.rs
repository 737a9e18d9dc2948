use crate::utils::{apply_derives, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Field, Item, ItemStruct, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[entity] / #[aggregate_root] 宏实现
/// - 若缺失则追加字段：`id: IdType`、`events: Outbox<EventType>`（不参与序列化），并置于字段最前
/// - 派生 Debug/Clone/Default/Serialize/Deserialize；用户写的 PartialEq/Eq/Hash 派生会被移除
/// - 生成 `::dfs_domain::entity::Entity` 实现，以及按 id 比较/哈希的 PartialEq/Eq/Hash
/// - `aggregate_root` 额外实现 `::dfs_domain::entity::AggregateRoot`
/// - 参数：`#[entity(event = EventType, id = IdType, name = "...", debug = true|false)]`
///   - `event` 必填；`id` 默认 `String`；`debug` 默认 `true`
///   - `name` 为 `Entity::TYPE`，默认是结构体名（不含模块路径）；不同模块中的同名类型
///     共用一个存储时必须显式指定
pub(crate) fn expand(attr: TokenStream, item: TokenStream, aggregate_root: bool) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityAttrConfig);
    let input = parse_macro_input!(item as Item);

    let macro_name = if aggregate_root {
        "#[aggregate_root]"
    } else {
        "#[entity]"
    };

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), format!("{macro_name} only on struct"))
                .to_compile_error()
                .into();
        }
    };

    let Some(event_ty) = cfg.event_ty else {
        return syn::Error::new(
            st.ident.span(),
            format!("{macro_name} requires the event type, e.g. {macro_name}(event = MyEvent)"),
        )
        .to_compile_error()
        .into();
    };

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let id_type = cfg.id_ty.unwrap_or_else(|| syn::parse_quote! { String });

    let id_field: Field = syn::parse_quote! { id: #id_type };
    let events_field: Field = syn::parse_quote! {
        #[serde(skip)]
        events: ::dfs_domain::domain_event::Outbox<#event_ty>
    };
    ensure_leading_fields(fields_named, vec![id_field, events_field]);

    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(Default),
        syn::parse_quote!(::serde::Serialize),
        syn::parse_quote!(::serde::Deserialize),
    ];
    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required, &["PartialEq", "Eq", "Hash"]);

    let out_struct = ItemStruct { ..st };

    let ident = &out_struct.ident;
    let type_name = cfg
        .type_name
        .unwrap_or_else(|| syn::LitStr::new(&ident.to_string(), ident.span()));
    let generics = out_struct.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let root_impl = if aggregate_root {
        quote! {
            impl #impl_generics ::dfs_domain::entity::AggregateRoot for #ident #ty_generics #where_clause {}
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        #out_struct

        impl #impl_generics ::dfs_domain::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_type;
            type Event = #event_ty;

            const TYPE: &'static str = #type_name;

            fn new(id: Self::Id) -> Self {
                Self { id, ..::core::default::Default::default() }
            }

            fn id(&self) -> &Self::Id { &self.id }

            fn events(&self) -> &::dfs_domain::domain_event::Outbox<Self::Event> { &self.events }

            fn events_mut(&mut self) -> &mut ::dfs_domain::domain_event::Outbox<Self::Event> {
                &mut self.events
            }
        }

        impl #impl_generics ::core::cmp::PartialEq for #ident #ty_generics #where_clause {
            fn eq(&self, other: &Self) -> bool { self.id == other.id }
        }

        impl #impl_generics ::core::cmp::Eq for #ident #ty_generics #where_clause {}

        impl #impl_generics ::core::hash::Hash for #ident #ty_generics #where_clause {
            fn hash<__H: ::core::hash::Hasher>(&self, state: &mut __H) {
                ::core::hash::Hash::hash(&self.id, state)
            }
        }

        #root_impl
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct EntityAttrConfig {
    id_ty: Option<Type>,
    event_ty: Option<Type>,
    type_name: Option<syn::LitStr>,
    derive_debug: Option<bool>,
}

impl Parse for EntityAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            id_ty: None,
            event_ty: None,
            type_name: None,
            derive_debug: None,
        };

        if input.is_empty() {
            return Ok(cfg);
        }

        let elems: Punctuated<EntityAttrElem, Token![,]> =
            Punctuated::<EntityAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                EntityAttrElem::Id(ty) => {
                    if cfg.id_ty.is_some() {
                        return Err(syn::Error::new(
                            ty.span(),
                            "duplicate key 'id' in attribute",
                        ));
                    }
                    cfg.id_ty = Some(*ty);
                }
                EntityAttrElem::Event(ty) => {
                    if cfg.event_ty.is_some() {
                        return Err(syn::Error::new(
                            ty.span(),
                            "duplicate key 'event' in attribute",
                        ));
                    }
                    cfg.event_ty = Some(*ty);
                }
                EntityAttrElem::Name(lit) => {
                    if cfg.type_name.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                    }
                    cfg.type_name = Some(lit);
                }
                EntityAttrElem::Debug(b, span) => {
                    if cfg.derive_debug.is_some() {
                        return Err(syn::Error::new(span, "duplicate key 'debug' in attribute"));
                    }
                    cfg.derive_debug = Some(b);
                }
            }
        }

        Ok(cfg)
    }
}

enum EntityAttrElem {
    Id(Box<Type>),
    Event(Box<Type>),
    Name(syn::LitStr),
    Debug(bool, proc_macro2::Span),
}

impl Parse for EntityAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "id" {
            Ok(EntityAttrElem::Id(Box::new(input.parse()?)))
        } else if key == "event" {
            Ok(EntityAttrElem::Event(Box::new(input.parse()?)))
        } else if key == "name" {
            Ok(EntityAttrElem::Name(input.parse()?))
        } else if key == "debug" {
            let expr: syn::Expr = input.parse()?;
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Bool(b),
                    ..
                }) => Ok(EntityAttrElem::Debug(b.value(), key.span())),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected boolean literal for 'debug'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'event', 'id', 'name' or 'debug'",
            ))
        }
    }
}
